//! Boundary with the converters that turn feed archives into entities.

use std::convert::Infallible;

use crate::Entity;

/// A converter producing the entities of one feed.
///
/// Implementations are responsible for emitting entities that already
/// satisfy the schema invariants (consistent `feed_id`, unique keys and
/// resolvable references); the store only stages and commits them.
pub trait FeedSource {
    /// Failure raised while converting.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Stream the entities of the feed, tagged with `feed_id`.
    fn entities<'a>(
        &'a self,
        feed_id: &'a str,
    ) -> Box<dyn Iterator<Item = Result<Entity, Self::Error>> + 'a>;
}

/// A feed held in memory, re-tagged with the requested feed id on read.
///
/// # Examples
/// ```
/// use transitdb_core::{FeedInfo, FeedSource, StaticFeed};
///
/// let source = StaticFeed::new(vec![FeedInfo::new("template").into()]);
/// let entities: Vec<_> = source.entities("paris").collect::<Result<_, _>>().unwrap();
/// assert_eq!(entities[0].feed_id(), "paris");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaticFeed {
    entities: Vec<Entity>,
}

impl StaticFeed {
    /// Wrap a set of entities.
    pub const fn new(entities: Vec<Entity>) -> Self {
        Self { entities }
    }

    /// Number of wrapped entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether no entity is wrapped.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl FromIterator<Entity> for StaticFeed {
    fn from_iter<I: IntoIterator<Item = Entity>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl FeedSource for StaticFeed {
    type Error = Infallible;

    fn entities<'a>(
        &'a self,
        feed_id: &'a str,
    ) -> Box<dyn Iterator<Item = Result<Entity, Self::Error>> + 'a> {
        Box::new(
            self.entities
                .iter()
                .map(move |entity| Ok(entity.clone().with_feed_id(feed_id))),
        )
    }
}
