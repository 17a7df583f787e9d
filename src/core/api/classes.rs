//! Categories, live classes, educator tools and admin category management

use super::client::{ApiClient, QueryParams, RequestOptions};
use super::error::ClientError;
use super::models::{
    Category, CertificateStats, CreateCategoryRequest, CreateLiveClassRequest,
    EducatorDashboardStats, LiveClass, LiveClassFilters, PageResponse, StudentSummary,
    UpdateCategoryRequest, UpdateLiveClassRequest,
};
use super::transport::{HttpTransport, Method};

/// Default page size for class listings
pub const DEFAULT_CLASS_PAGE_SIZE: u32 = 12;

/// Default page size for the student roster
pub const DEFAULT_STUDENT_PAGE_SIZE: u32 = 20;

/// Client for `/v1/categories`, `/v1/classes` and `/v1/educator/...`
#[derive(Clone)]
pub struct ClassesApi<T> {
    client: ApiClient<T>,
}

impl<T: HttpTransport> ClassesApi<T> {
    pub fn new(client: ApiClient<T>) -> Self {
        Self { client }
    }

    // ===== Categories =====

    /// Visible categories
    pub async fn get_categories(&self) -> Result<Vec<Category>, ClientError> {
        self.client.get("/v1/categories").await
    }

    pub async fn get_category_by_slug(&self, slug: &str) -> Result<Category, ClientError> {
        self.client.get(&format!("/v1/categories/{}", slug)).await
    }

    // ===== Public class listings =====

    pub async fn get_upcoming_classes(
        &self,
        page: u32,
        size: u32,
    ) -> Result<PageResponse<LiveClass>, ClientError> {
        self.client
            .get_with_query("/v1/classes", QueryParams::paged(page, size))
            .await
    }

    /// Classes that are live right now
    pub async fn get_live_now(&self) -> Result<Vec<LiveClass>, ClientError> {
        self.client.get("/v1/classes/live").await
    }

    pub async fn get_classes_by_category(
        &self,
        slug: &str,
        page: u32,
        size: u32,
    ) -> Result<PageResponse<LiveClass>, ClientError> {
        self.client
            .get_with_query(
                &format!("/v1/classes/category/{}", slug),
                QueryParams::paged(page, size),
            )
            .await
    }

    pub async fn get_classes_by_educator(
        &self,
        educator_id: &str,
        page: u32,
        size: u32,
    ) -> Result<PageResponse<LiveClass>, ClientError> {
        self.client
            .get_with_query(
                &format!("/v1/classes/educator/{}", educator_id),
                QueryParams::paged(page, size),
            )
            .await
    }

    pub async fn get_class_by_id(&self, id: &str) -> Result<LiveClass, ClientError> {
        self.client.get(&format!("/v1/classes/{}", id)).await
    }

    pub async fn search_classes(
        &self,
        query: &str,
        page: u32,
        size: u32,
    ) -> Result<PageResponse<LiveClass>, ClientError> {
        let params = QueryParams::new()
            .set("q", query)
            .set("page", page)
            .set("size", size);
        self.client.get_with_query("/v1/classes/search", params).await
    }

    // ===== Educator classes (EDUCATOR role) =====

    /// The educator's own classes; unset filters are left out of the query
    pub async fn get_my_classes(
        &self,
        filters: &LiveClassFilters,
        page: u32,
        size: u32,
    ) -> Result<PageResponse<LiveClass>, ClientError> {
        let params = QueryParams::paged(page, size)
            .set_opt("filter", filters.filter)
            .set_opt("categoryId", filters.category_id.as_deref())
            .set_opt("skillLevel", filters.skill_level)
            .set_opt("startDate", filters.start_date.as_deref())
            .set_opt("endDate", filters.end_date.as_deref())
            .set_opt("search", filters.search.as_deref());

        self.client.get_with_query("/v1/educator/classes", params).await
    }

    pub async fn get_my_class_by_id(&self, id: &str) -> Result<LiveClass, ClientError> {
        self.client.get(&format!("/v1/educator/classes/{}", id)).await
    }

    pub async fn create_class(
        &self,
        data: &CreateLiveClassRequest,
    ) -> Result<LiveClass, ClientError> {
        self.client
            .send_json(Method::Post, "/v1/educator/classes", data)
            .await
    }

    pub async fn update_class(
        &self,
        id: &str,
        data: &UpdateLiveClassRequest,
    ) -> Result<LiveClass, ClientError> {
        self.client
            .send_json(Method::Put, &format!("/v1/educator/classes/{}", id), data)
            .await
    }

    pub async fn cancel_class(&self, id: &str) -> Result<(), ClientError> {
        self.client
            .request_empty(
                Method::Delete,
                &format!("/v1/educator/classes/{}", id),
                RequestOptions::new(),
            )
            .await
    }

    pub async fn start_class(&self, id: &str, meeting_url: &str) -> Result<LiveClass, ClientError> {
        let options = RequestOptions::new().query(QueryParams::new().set("meetingUrl", meeting_url));
        self.client
            .request(
                Method::Post,
                &format!("/v1/educator/classes/{}/start", id),
                options,
            )
            .await
    }

    pub async fn end_class(
        &self,
        id: &str,
        recording_url: Option<&str>,
    ) -> Result<LiveClass, ClientError> {
        let options =
            RequestOptions::new().query(QueryParams::new().set_opt("recordingUrl", recording_url));
        self.client
            .request(
                Method::Post,
                &format!("/v1/educator/classes/{}/end", id),
                options,
            )
            .await
    }

    // ===== Students (EDUCATOR role) =====

    pub async fn get_my_students(
        &self,
        search: Option<&str>,
        page: u32,
        size: u32,
    ) -> Result<PageResponse<StudentSummary>, ClientError> {
        let params = QueryParams::paged(page, size).set_opt("search", search);
        self.client.get_with_query("/v1/educator/students", params).await
    }

    pub async fn get_student_count(&self) -> Result<u64, ClientError> {
        self.client.get("/v1/educator/students/count").await
    }

    // ===== Earnings (EDUCATOR role) =====

    /// PDF earnings report as raw bytes
    pub async fn download_earnings_report_pdf(&self) -> Result<Vec<u8>, ClientError> {
        self.client
            .request_bytes("/v1/educator/earnings/report/pdf")
            .await
    }

    // ===== Stats (EDUCATOR role) =====

    pub async fn get_educator_stats(&self) -> Result<EducatorDashboardStats, ClientError> {
        self.client.get("/v1/educator/stats/overview").await
    }

    pub async fn get_certificate_stats(&self) -> Result<CertificateStats, ClientError> {
        self.client.get("/v1/educator/stats/certificates").await
    }

    // ===== Admin categories (ADMIN role) =====

    /// Every category, hidden ones included
    pub async fn get_all_categories(&self) -> Result<Vec<Category>, ClientError> {
        self.client.get("/v1/categories/all").await
    }

    pub async fn create_category(
        &self,
        data: &CreateCategoryRequest,
    ) -> Result<Category, ClientError> {
        self.client
            .send_json(Method::Post, "/v1/categories", data)
            .await
    }

    pub async fn update_category(
        &self,
        id: &str,
        data: &UpdateCategoryRequest,
    ) -> Result<Category, ClientError> {
        self.client
            .send_json(Method::Put, &format!("/v1/categories/{}", id), data)
            .await
    }

    pub async fn toggle_category_visibility(&self, id: &str) -> Result<(), ClientError> {
        self.client
            .request_empty(
                Method::Patch,
                &format!("/v1/categories/{}/toggle-visibility", id),
                RequestOptions::new(),
            )
            .await
    }
}
