//! Request parameters for list endpoints
//!
//! Query strings are first decoded into [`EmployeeQuery`], where every key is
//! optional, and then resolved against the paging configuration into
//! [`EmployeeParameters`]. Resolution never fails; the age range is checked
//! separately through [`EmployeeParameters::valid_age_range`].

use serde::{Deserialize, Serialize};

use crate::config::PagingConfig;

/// Paging, ordering and shaping options shared by list endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestParameters {
    /// Page number (1-indexed)
    pub page_number: u32,
    /// Number of items per page, within `[1, max_page_size]`
    pub page_size: u32,
    /// Comma separated `field [asc|desc]` list
    pub order_by: String,
    /// Comma separated field list for data shaping
    pub fields: Option<String>,
}

impl Default for RequestParameters {
    fn default() -> Self {
        let paging = PagingConfig::default();
        Self {
            page_number: 1,
            page_size: paging.default_page_size,
            order_by: String::new(),
            fields: None,
        }
    }
}

impl RequestParameters {
    /// Create paging options, clamping both values into their valid range
    pub fn new(page_number: u32, page_size: u32, paging: &PagingConfig) -> Self {
        Self {
            page_number: page_number.max(1),
            page_size: page_size.clamp(1, paging.max_page_size.max(1)),
            order_by: String::new(),
            fields: None,
        }
    }

    /// Set the ordering
    pub fn with_order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = order_by.into();
        self
    }

    /// Set the requested fields
    pub fn with_fields(mut self, fields: impl Into<String>) -> Self {
        self.fields = Some(fields.into());
        self
    }
}

/// Options for listing the employees of one company
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeParameters {
    /// Paging, ordering and shaping
    #[serde(flatten)]
    pub request: RequestParameters,
    /// Inclusive lower age bound
    pub min_age: u32,
    /// Inclusive upper age bound
    pub max_age: u32,
    /// Case-insensitive substring of the employee name
    pub search_term: Option<String>,
}

impl Default for EmployeeParameters {
    fn default() -> Self {
        Self {
            request: RequestParameters::default().with_order_by(Self::DEFAULT_ORDER_BY),
            min_age: 0,
            max_age: i32::MAX as u32,
            search_term: None,
        }
    }
}

impl EmployeeParameters {
    /// Ordering used when the client sends none
    pub const DEFAULT_ORDER_BY: &'static str = "name";

    /// Check that `max_age` is strictly greater than `min_age`
    pub fn valid_age_range(&self) -> bool {
        self.max_age > self.min_age
    }

    /// Restrict the age range
    pub fn with_age_range(mut self, min_age: u32, max_age: u32) -> Self {
        self.min_age = min_age;
        self.max_age = max_age;
        self
    }

    /// Set the name search term
    pub fn with_search_term(mut self, search_term: impl Into<String>) -> Self {
        self.search_term = Some(search_term.into());
        self
    }

    /// Replace paging options
    pub fn with_paging(mut self, page_number: u32, page_size: u32, paging: &PagingConfig) -> Self {
        let order_by = std::mem::take(&mut self.request.order_by);
        let fields = self.request.fields.take();
        self.request = RequestParameters {
            order_by,
            fields,
            ..RequestParameters::new(page_number, page_size, paging)
        };
        self
    }

    /// Search term trimmed and lowercased, `None` when blank
    pub fn normalized_search_term(&self) -> Option<String> {
        self.search_term
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(str::to_lowercase)
    }
}

/// Raw query string of the employee list endpoint
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeQuery {
    pub page_number: Option<u32>,
    pub page_size: Option<u32>,
    pub order_by: Option<String>,
    pub fields: Option<String>,
    pub min_age: Option<u32>,
    pub max_age: Option<u32>,
    pub search_term: Option<String>,
}

impl EmployeeQuery {
    /// Resolve defaults and clamp paging against `paging`
    pub fn into_parameters(self, paging: &PagingConfig) -> EmployeeParameters {
        let defaults = EmployeeParameters::default();

        let order_by = self
            .order_by
            .filter(|o| !o.trim().is_empty())
            .unwrap_or_else(|| EmployeeParameters::DEFAULT_ORDER_BY.to_string());

        let mut request = RequestParameters::new(
            self.page_number.unwrap_or(1),
            self.page_size.unwrap_or(paging.default_page_size),
            paging,
        )
        .with_order_by(order_by);
        request.fields = self.fields;

        EmployeeParameters {
            request,
            min_age: self.min_age.unwrap_or(defaults.min_age),
            max_age: self.max_age.unwrap_or(defaults.max_age),
            search_term: self.search_term,
        }
    }
}
