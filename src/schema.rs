use std::sync::Arc;

use chrono::{DateTime, Utc};
use juniper::{graphql_object, EmptyMutation, EmptySubscription, RootNode};

use crate::{cache::Multithreaded, menu::WeeklyMenu};

#[derive(Clone, Debug)]
pub struct Query(Arc<Multithreaded>);

impl Query {
    pub const fn new(cache: Arc<Multithreaded>) -> Self {
        Self(cache)
    }
}

#[graphql_object]
impl Query {
    /// The most recently scraped week, merged across every dining location.
    async fn weekly_menu(&self) -> WeeklyMenu {
        self.0.get().await.menu().clone()
    }

    /// When the menu was last scraped.
    async fn last_refresh(&self) -> DateTime<Utc> {
        self.0.get().await.cached_at()
    }
}

pub type Schema = RootNode<'static, Query, EmptyMutation, EmptySubscription>;

pub fn schema(cache: Arc<Multithreaded>) -> Schema {
    Schema::new(Query::new(cache), EmptyMutation::new(), EmptySubscription::new())
}
