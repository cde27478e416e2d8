//! Shared query parameter types for API handlers.
//!
//! List-valued filters travel as comma-separated strings
//! (`?sources=activity,donation`).

use std::str::FromStr;

use serde::Deserialize;
use steward_core::timeline::filters::ALL_ENTITIES;
use steward_core::timeline::{EntityType, EventSource, TimelineFilters, TimelinePaginationCursor};
use steward_core::types::{DbId, Timestamp};

use crate::error::{AppError, AppResult};

/// `?entity_type=&entity_id=`. A missing id means every entity.
#[derive(Debug, Default, Deserialize)]
pub struct EntityParams {
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
}

impl EntityParams {
    pub fn entity_type(&self) -> AppResult<EntityType> {
        parse_entity_type(self.entity_type.as_deref())
    }

    pub fn entity_id(&self) -> &str {
        self.entity_id.as_deref().unwrap_or(ALL_ENTITIES)
    }

    /// Filters for the entity with every source enabled.
    pub fn filters(&self) -> AppResult<TimelineFilters> {
        Ok(TimelineFilters::for_entity(self.entity_type()?, self.entity_id()))
    }
}

fn parse_entity_type(raw: Option<&str>) -> AppResult<EntityType> {
    match raw {
        Some(raw) => Ok(raw.parse()?),
        None => Ok(EntityType::default()),
    }
}

/// Query parameters for `GET /timeline`.
#[derive(Debug, Default, Deserialize)]
pub struct TimelineQueryParams {
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    /// Omitted means every source; an empty value means none.
    pub sources: Option<String>,
    pub event_types: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub team_member_ids: Option<String>,
    pub project_ids: Option<String>,
    pub statuses: Option<String>,
    pub priorities: Option<String>,
    pub search: Option<String>,
    pub page_size: Option<usize>,
    /// Cursor timestamp; must be sent together with `cursor_id`.
    pub cursor_ts: Option<String>,
    pub cursor_id: Option<String>,
}

impl TimelineQueryParams {
    pub fn filters(&self) -> AppResult<TimelineFilters> {
        let mut filters = TimelineFilters::for_entity(
            parse_entity_type(self.entity_type.as_deref())?,
            self.entity_id.as_deref().unwrap_or(ALL_ENTITIES),
        );

        if let Some(raw) = &self.sources {
            filters.event_sources = parse_list::<EventSource>(raw, "sources")?;
        }
        filters.event_types = self.event_types.as_deref().map(split_list).unwrap_or_default();
        filters.date_from = parse_timestamp(self.date_from.as_deref(), "date_from")?;
        filters.date_to = parse_timestamp(self.date_to.as_deref(), "date_to")?;
        if let Some(raw) = &self.team_member_ids {
            filters.team_member_ids = parse_list::<DbId>(raw, "team_member_ids")?;
        }
        if let Some(raw) = &self.project_ids {
            filters.project_ids = parse_list::<DbId>(raw, "project_ids")?;
        }
        filters.status_filters = self.statuses.as_deref().map(split_list).unwrap_or_default();
        filters.priority_filters = self.priorities.as_deref().map(split_list).unwrap_or_default();
        filters.search_query = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Ok(filters)
    }

    pub fn cursor(&self) -> AppResult<Option<TimelinePaginationCursor>> {
        match (&self.cursor_ts, &self.cursor_id) {
            (None, None) => Ok(None),
            (Some(ts), Some(id)) => Ok(Some(TimelinePaginationCursor {
                timestamp: parse_timestamp(Some(ts), "cursor_ts")?
                    .ok_or_else(|| AppError::BadRequest("cursor_ts is empty".into()))?,
                event_id: id.clone(),
            })),
            _ => Err(AppError::BadRequest(
                "cursor_ts and cursor_id must be given together".into(),
            )),
        }
    }
}

/// `?limit=` for short listings.
#[derive(Debug, Deserialize)]
pub struct LimitParams {
    pub limit: Option<usize>,
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_list<T: FromStr>(raw: &str, field: &str) -> AppResult<Vec<T>> {
    split_list(raw)
        .iter()
        .map(|item| {
            item.parse::<T>()
                .map_err(|_| AppError::BadRequest(format!("Invalid value in {field}: {item}")))
        })
        .collect()
}

/// Parse an optional RFC 3339 timestamp. Blank values count as absent.
fn parse_timestamp(raw: Option<&str>, field: &str) -> AppResult<Option<Timestamp>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(v) => v
            .parse::<Timestamp>()
            .map(Some)
            .map_err(|_| AppError::BadRequest(format!("Invalid date format for {field}"))),
        None => Ok(None),
    }
}
