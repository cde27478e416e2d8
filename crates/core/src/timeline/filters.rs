//! Timeline query filters and entity scoping.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::timeline::event::UnifiedTimelineEvent;
use crate::timeline::source::EventSource;
use crate::types::{DbId, Timestamp};

/// Entity id that disables scoping and returns events for every entity.
pub const ALL_ENTITIES: &str = "all";

/// Prefix of preview/demo entity ids, which are never scoped.
pub const DEMO_ENTITY_PREFIX: &str = "demo-";

/// Whether `entity_id` opts out of entity scoping (`"all"` or `demo-*`).
pub fn is_passthrough_entity(entity_id: &str) -> bool {
    entity_id == ALL_ENTITIES || entity_id.starts_with(DEMO_ENTITY_PREFIX)
}

/// Kind of entity a timeline is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    #[default]
    #[serde(alias = "client", alias = "organization")]
    Contact,
    Project,
    DonorMove,
}

impl EntityType {
    /// Column on every timeline table that references this entity kind.
    pub fn column(self) -> &'static str {
        match self {
            EntityType::Contact => "client_id",
            EntityType::Project => "project_id",
            EntityType::DonorMove => "donor_move_id",
        }
    }
}

impl std::str::FromStr for EntityType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "contact" | "client" | "organization" => Ok(EntityType::Contact),
            "project" => Ok(EntityType::Project),
            "donor_move" => Ok(EntityType::DonorMove),
            other => Err(CoreError::Validation(format!("Unknown entity type: {other}"))),
        }
    }
}

/// A resolved entity scope: one column that must equal one id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityScope {
    pub entity_type: EntityType,
    pub entity_id: DbId,
}

impl EntityScope {
    pub fn column(&self) -> &'static str {
        self.entity_type.column()
    }

    /// Whether `event` references the scoped entity.
    pub fn matches(&self, event: &UnifiedTimelineEvent) -> bool {
        self.matches_refs(event.client_id, event.project_id, event.donor_move_id)
    }

    /// Same check on raw row references.
    pub fn matches_refs(
        &self,
        client_id: Option<DbId>,
        project_id: Option<DbId>,
        donor_move_id: Option<DbId>,
    ) -> bool {
        let referenced = match self.entity_type {
            EntityType::Contact => client_id,
            EntityType::Project => project_id,
            EntityType::DonorMove => donor_move_id,
        };
        referenced == Some(self.entity_id)
    }
}

/// Query descriptor for the timeline. Pure value object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimelineFilters {
    pub entity_type: EntityType,
    pub entity_id: String,
    /// Sources whose fetchers run. Empty means nothing is fetched.
    pub event_sources: Vec<EventSource>,
    pub event_types: Vec<String>,
    pub date_from: Option<Timestamp>,
    pub date_to: Option<Timestamp>,
    pub team_member_ids: Vec<DbId>,
    pub project_ids: Vec<DbId>,
    pub status_filters: Vec<String>,
    pub priority_filters: Vec<String>,
    pub search_query: Option<String>,
}

impl Default for TimelineFilters {
    fn default() -> Self {
        Self::for_entity(EntityType::Contact, ALL_ENTITIES)
    }
}

impl TimelineFilters {
    /// Filters for one entity with every source enabled.
    pub fn for_entity(entity_type: EntityType, entity_id: impl Into<String>) -> Self {
        Self {
            entity_type,
            entity_id: entity_id.into(),
            event_sources: EventSource::ALL.to_vec(),
            event_types: Vec::new(),
            date_from: None,
            date_to: None,
            team_member_ids: Vec::new(),
            project_ids: Vec::new(),
            status_filters: Vec::new(),
            priority_filters: Vec::new(),
            search_query: None,
        }
    }

    pub fn with_sources(mut self, sources: impl IntoIterator<Item = EventSource>) -> Self {
        self.event_sources = sources.into_iter().collect();
        self
    }

    pub fn with_search(mut self, query: impl Into<String>) -> Self {
        self.search_query = Some(query.into());
        self
    }

    pub fn is_source_enabled(&self, source: EventSource) -> bool {
        self.event_sources.contains(&source)
    }

    /// Resolve the entity scope.
    ///
    /// Returns `Ok(None)` for pass-through ids (`"all"`, `demo-*`) and a
    /// validation error when the id is neither pass-through nor numeric.
    pub fn entity_scope(&self) -> Result<Option<EntityScope>, CoreError> {
        if is_passthrough_entity(&self.entity_id) {
            return Ok(None);
        }
        let entity_id = self.entity_id.parse::<DbId>().map_err(|_| {
            CoreError::Validation(format!("Invalid entity id: {}", self.entity_id))
        })?;
        Ok(Some(EntityScope {
            entity_type: self.entity_type,
            entity_id,
        }))
    }

    /// The trimmed search query, or `None` when absent or blank.
    pub fn search_term(&self) -> Option<&str> {
        self.search_query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }

    /// In-memory predicate equivalent to the filters pushed into queries.
    ///
    /// Entity scope and source selection are not checked here; they decide
    /// which fetchers run and what they query.
    pub fn matches(&self, event: &UnifiedTimelineEvent) -> bool {
        if self.date_from.is_some_and(|from| event.timestamp < from) {
            return false;
        }
        if self.date_to.is_some_and(|to| event.timestamp > to) {
            return false;
        }
        if !self.event_types.is_empty()
            && !event
                .details
                .event_type()
                .is_some_and(|t| self.event_types.iter().any(|wanted| wanted == t))
        {
            return false;
        }
        if !self.team_member_ids.is_empty()
            && !event
                .created_by
                .is_some_and(|id| self.team_member_ids.contains(&id))
        {
            return false;
        }
        if !self.project_ids.is_empty()
            && !event
                .project_id
                .is_some_and(|id| self.project_ids.contains(&id))
        {
            return false;
        }
        if !self.status_filters.is_empty()
            && !event
                .details
                .status()
                .is_some_and(|s| self.status_filters.iter().any(|wanted| wanted == s))
        {
            return false;
        }
        if !self.priority_filters.is_empty()
            && !event
                .details
                .priority()
                .is_some_and(|p| self.priority_filters.iter().any(|wanted| wanted == p))
        {
            return false;
        }
        match self.search_term() {
            Some(term) => matches_search(event, term),
            None => true,
        }
    }
}

/// Case-insensitive substring match on title or description.
pub fn matches_search(event: &UnifiedTimelineEvent, term: &str) -> bool {
    let needle = term.to_lowercase();
    event.title.to_lowercase().contains(&needle)
        || event
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(&needle))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::timeline::event::EventDetails;

    fn activity(title: &str, description: Option<&str>) -> UnifiedTimelineEvent {
        let mut event = UnifiedTimelineEvent::new(
            "1",
            chrono::Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap(),
            title,
            EventDetails::Activity {
                activity_type: "meeting".into(),
                status: Some("completed".into()),
                priority: Some("high".into()),
            },
        );
        event.description = description.map(str::to_string);
        event.client_id = Some(5);
        event.created_by = Some(9);
        event
    }

    #[test]
    fn demo_and_all_ids_pass_through() {
        assert!(is_passthrough_entity("all"));
        assert!(is_passthrough_entity("demo-contact-1"));
        assert!(!is_passthrough_entity("42"));

        let filters = TimelineFilters::for_entity(EntityType::Contact, "demo-contact-1");
        assert_eq!(filters.entity_scope().unwrap(), None);
    }

    #[test]
    fn numeric_entity_id_resolves_to_scope() {
        let filters = TimelineFilters::for_entity(EntityType::Project, "17");
        let scope = filters.entity_scope().unwrap().unwrap();
        assert_eq!(scope.entity_id, 17);
        assert_eq!(scope.column(), "project_id");
    }

    #[test]
    fn garbage_entity_id_is_rejected() {
        let filters = TimelineFilters::for_entity(EntityType::Contact, "abc");
        assert!(matches!(filters.entity_scope(), Err(CoreError::Validation(_))));
    }

    #[test]
    fn scope_matches_referenced_entity() {
        let scope = EntityScope {
            entity_type: EntityType::Contact,
            entity_id: 5,
        };
        assert!(scope.matches(&activity("x", None)));
        let other = EntityScope {
            entity_type: EntityType::Contact,
            entity_id: 6,
        };
        assert!(!other.matches(&activity("x", None)));
    }

    #[test]
    fn search_is_case_insensitive_over_title_and_description() {
        assert!(matches_search(&activity("Gala planning session", None), "gala"));
        assert!(matches_search(&activity("Call", Some("Talked about the GALA")), "gala"));
        assert!(!matches_search(&activity("Budget review", None), "gala"));
    }

    #[test]
    fn blank_search_matches_everything() {
        let filters = TimelineFilters::default().with_search("   ");
        assert_eq!(filters.search_term(), None);
        assert!(filters.matches(&activity("Budget review", None)));
    }

    #[test]
    fn classification_filters_apply() {
        let event = activity("Call", None);
        let mut filters = TimelineFilters::default();
        filters.event_types = vec!["meeting".into()];
        filters.status_filters = vec!["completed".into()];
        filters.priority_filters = vec!["high".into()];
        filters.team_member_ids = vec![9];
        assert!(filters.matches(&event));

        filters.priority_filters = vec!["low".into()];
        assert!(!filters.matches(&event));
    }

    #[test]
    fn date_bounds_are_inclusive() {
        let event = activity("Call", None);
        let mut filters = TimelineFilters::default();
        filters.date_from = Some(event.timestamp);
        filters.date_to = Some(event.timestamp);
        assert!(filters.matches(&event));

        filters.date_from = Some(event.timestamp + chrono::Duration::seconds(1));
        assert!(!filters.matches(&event));
    }

    #[test]
    fn entity_type_parses_aliases() {
        assert_eq!("client".parse::<EntityType>().unwrap(), EntityType::Contact);
        assert_eq!("donor_move".parse::<EntityType>().unwrap(), EntityType::DonorMove);
        assert!("planet".parse::<EntityType>().is_err());
    }
}
