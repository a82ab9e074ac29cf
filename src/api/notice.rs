use actix_web::{
    HttpRequest, HttpResponse,
    cookie::{Cookie, SameSite},
    http::header,
};

/**
 * Name of the cookie carrying a notice across a redirect.
 */
pub const NOTICE_COOKIE: &str = "notice";

/**
 * Notices shown once on the page a successful mutation redirects to.
 *
 * Only the key travels in the cookie, so nothing the client sends ends up in the page.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    RegionAdded,
    RegionUpdated,
    RegionDeleted,
    SalesDataAdded,
    SalesDataUpdated,
    SalesDataDeleted,
}

impl Notice {
    const ALL: [Notice; 6] = [Notice::RegionAdded, Notice::RegionUpdated, Notice::RegionDeleted, Notice::SalesDataAdded, Notice::SalesDataUpdated, Notice::SalesDataDeleted];

    pub fn key(self) -> &'static str {
        match self {
            Notice::RegionAdded => "region_added",
            Notice::RegionUpdated => "region_updated",
            Notice::RegionDeleted => "region_deleted",
            Notice::SalesDataAdded => "sales_data_added",
            Notice::SalesDataUpdated => "sales_data_updated",
            Notice::SalesDataDeleted => "sales_data_deleted",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Notice::RegionAdded => "Region added successfully!",
            Notice::RegionUpdated => "Region updated successfully!",
            Notice::RegionDeleted => "Region deleted successfully!",
            Notice::SalesDataAdded => "New sales data added successfully!",
            Notice::SalesDataUpdated => "Sales data updated successfully!",
            Notice::SalesDataDeleted => "Sales data deleted successfully!",
        }
    }

    pub fn from_key(key: &str) -> Option<Notice> {
        Notice::ALL.into_iter().find(|notice| notice.key() == key)
    }
}

/**
 * Builds a 303 redirect carrying a notice for the next page.
 *
 * # Arguments
 * `location`: Path to redirect to.
 * `notice`: Notice to show on that page.
 */
pub fn redirect_with_notice(location: &str, notice: Notice) -> HttpResponse {
    let cookie = Cookie::build(NOTICE_COOKIE, notice.key()).path("/").http_only(true).same_site(SameSite::Lax).finish();
    HttpResponse::SeeOther().insert_header((header::LOCATION, location)).cookie(cookie).finish()
}

/**
 * Reads the pending notice of the request, if any. Unknown keys are ignored.
 */
pub fn pending_notice(http_request: &HttpRequest) -> Option<Notice> {
    http_request.cookie(NOTICE_COOKIE).and_then(|cookie| Notice::from_key(cookie.value()))
}

/**
 * Expires the notice cookie once the notice has been shown.
 */
pub fn clear_notice(http_request: &HttpRequest, response: &mut HttpResponse) {
    if http_request.cookie(NOTICE_COOKIE).is_some() {
        let removal = Cookie::build(NOTICE_COOKIE, "").path("/").finish();
        if let Err(err) = response.add_removal_cookie(&removal) {
            tracing::warn!("Failed to clear notice cookie: {err}");
        }
    }
}
