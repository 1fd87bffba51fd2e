//! Hypermedia links for employee resources
//!
//! Clients opt in by sending `Accept: application/vnd.codemaze.hateoas+json`.
//! Otherwise shaped employees are returned without links.

use serde::Serialize;
use uuid::Uuid;

use crate::models::EmployeeDto;

use super::shaping::{DataShaper, ShapedEntity, ShapingError};

/// Media type that asks for linked responses
pub const HATEOAS_MEDIA_TYPE: &str = "application/vnd.codemaze.hateoas+json";

/// A hypermedia link
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub href: String,
    pub rel: String,
    pub method: String,
}

impl Link {
    pub fn new(href: impl Into<String>, rel: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            rel: rel.into(),
            method: method.into(),
        }
    }
}

/// Shaped entity with its links, serialized as one object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkedEntity {
    #[serde(flatten)]
    pub entity: ShapedEntity,
    pub links: Vec<Link>,
}

/// Collection of items plus links for the collection itself
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkCollectionWrapper<T> {
    pub value: Vec<T>,
    pub links: Vec<Link>,
}

impl<T> Default for LinkCollectionWrapper<T> {
    fn default() -> Self {
        Self {
            value: Vec::new(),
            links: Vec::new(),
        }
    }
}

/// Result of link generation: either plain shaped entities or linked ones
#[derive(Debug, Clone, PartialEq)]
pub struct LinkResponse {
    pub has_links: bool,
    pub shaped_entities: Vec<ShapedEntity>,
    pub linked_entities: LinkCollectionWrapper<LinkedEntity>,
}

/// Negotiated request details needed to build links
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteContext {
    /// Whether the client accepted [`HATEOAS_MEDIA_TYPE`]
    pub hateoas: bool,
    /// Scheme and authority, e.g. `http://localhost:8080`
    pub base_url: String,
}

impl RouteContext {
    /// Build a context from an `Accept` header value
    pub fn from_accept(accept: &str, base_url: impl Into<String>) -> Self {
        Self {
            hateoas: accepts_hateoas(accept),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

/// Check whether any media range in an `Accept` value is the HATEOAS type
pub fn accepts_hateoas(accept: &str) -> bool {
    accept.split(',').any(|range| {
        range
            .split(';')
            .next()
            .map(str::trim)
            .is_some_and(|media_type| media_type.eq_ignore_ascii_case(HATEOAS_MEDIA_TYPE))
    })
}

/// Check that an `Accept` value holds at least one `type/subtype` range
pub fn is_valid_accept(accept: &str) -> bool {
    accept.split(',').any(|range| {
        let media_type = range.split(';').next().unwrap_or("").trim();
        match media_type.split_once('/') {
            Some((kind, subtype)) => {
                !kind.is_empty()
                    && !subtype.is_empty()
                    && !media_type.contains(char::is_whitespace)
                    && !subtype.contains('/')
            }
            None => false,
        }
    })
}

/// Builds links for employees of one company
#[derive(Clone)]
pub struct EmployeeLinks {
    shaper: DataShaper<EmployeeDto>,
}

impl EmployeeLinks {
    pub fn new() -> Result<Self, ShapingError> {
        Ok(Self {
            shaper: DataShaper::new()?,
        })
    }

    pub fn shaper(&self) -> &DataShaper<EmployeeDto> {
        &self.shaper
    }

    /// Shape `employees` and, when the client asked for hypermedia, attach links
    pub fn try_generate_links(
        &self,
        employees: &[EmployeeDto],
        fields: Option<&str>,
        company_id: Uuid,
        ctx: &RouteContext,
    ) -> LinkResponse {
        let shaped = self.shaper.shape_data(employees, fields);

        if !ctx.hateoas {
            return LinkResponse {
                has_links: false,
                shaped_entities: shaped,
                linked_entities: LinkCollectionWrapper::default(),
            };
        }

        let value = employees
            .iter()
            .zip(shaped)
            .map(|(employee, entity)| LinkedEntity {
                entity,
                links: self.entity_links(ctx, company_id, employee.id, fields),
            })
            .collect();

        LinkResponse {
            has_links: true,
            shaped_entities: Vec::new(),
            linked_entities: LinkCollectionWrapper {
                value,
                links: vec![Link::new(collection_href(ctx, company_id), "self", "GET")],
            },
        }
    }

    fn entity_links(
        &self,
        ctx: &RouteContext,
        company_id: Uuid,
        id: Uuid,
        fields: Option<&str>,
    ) -> Vec<Link> {
        let href = format!("{}/{}", collection_href(ctx, company_id), id);
        let self_href = match fields.map(str::trim).filter(|f| !f.is_empty()) {
            Some(fields) => format!("{}?fields={}", href, urlencoding::encode(fields)),
            None => href.clone(),
        };

        vec![
            Link::new(self_href, "self", "GET"),
            Link::new(href.clone(), "delete_employee", "DELETE"),
            Link::new(href.clone(), "update_employee", "PUT"),
            Link::new(href, "partially_update_employee", "PATCH"),
        ]
    }
}

fn collection_href(ctx: &RouteContext, company_id: Uuid) -> String {
    format!("{}/api/companies/{}/employees", ctx.base_url, company_id)
}
