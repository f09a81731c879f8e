use crate::models::report::TicketResponse;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Deserialize, Serialize, ToSchema)]
pub struct PaginationParams {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: Some(1),
            limit: Some(20),
        }
    }
}

impl PaginationParams {
    pub fn new(page: Option<u64>, limit: Option<u64>) -> Self {
        Self { page, limit }
    }

    pub fn page(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> u64 {
        self.limit.unwrap_or(20).clamp(1, 200)
    }

    pub fn offset(&self) -> u64 {
        (self.page() - 1) * self.limit()
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[aliases(PaginatedTicketResponse = PaginatedResponse<TicketResponse>)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, params: &PaginationParams, total: u64) -> Self {
        let limit = params.limit();
        let total_pages = if total == 0 {
            1
        } else {
            (total + limit - 1) / limit
        };
        Self {
            data,
            total,
            page: params.page(),
            limit,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_params() {
        let params = PaginationParams::new(Some(3), Some(25));
        assert_eq!(params.page(), 3);
        assert_eq!(params.limit(), 25);
        assert_eq!(params.offset(), 50);
    }

    #[test]
    fn test_pagination_params_defaults() {
        let params = PaginationParams::new(None, None);
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), 20);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let params = PaginationParams::new(Some(1), Some(10));
        let page = PaginatedResponse::new(vec![1, 2, 3], &params, 25);
        assert_eq!(page.total_pages, 3);

        let empty = PaginatedResponse::<i32>::new(vec![], &params, 0);
        assert_eq!(empty.total_pages, 1);
    }
}
