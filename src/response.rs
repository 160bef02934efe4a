use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct Meta {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub total: Option<i64>,
}

impl Meta {
    pub fn new(page: i64, per_page: i64, total: i64) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
            total: Some(total),
        }
    }

    /// Meta for an unpaginated list: everything on one page.
    pub fn whole_list(total: usize) -> Self {
        let total = total as i64;
        Self::new(1, total, total)
    }

    pub fn empty() -> Self {
        Self {
            page: None,
            per_page: None,
            total: None,
        }
    }
}

/// Envelope shared by every JSON response, errors included.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: Option<T>,
    pub meta: Option<Meta>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T, meta: Option<Meta>) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
            meta,
        }
    }

    pub fn single(message: impl Into<String>, data: T) -> Self {
        Self::success(message, data, Some(Meta::empty()))
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_resources_carry_empty_meta() {
        let body = serde_json::to_value(ApiResponse::single("OK", 7)).unwrap();
        assert_eq!(body["data"], 7);
        assert!(body["meta"]["total"].is_null());
    }

    #[test]
    fn whole_lists_report_one_page() {
        let meta = Meta::whole_list(3);
        assert_eq!((meta.page, meta.per_page, meta.total), (Some(1), Some(3), Some(3)));
    }
}
