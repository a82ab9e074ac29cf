use actix_web::web;

pub mod endpoints;
pub mod middleware;
pub mod navigation;
pub mod notice;
pub mod reports;
pub mod state;
pub mod views;

/**
 * Registers every route of the application.
 *
 * The top level redirects are registered before the scopes, otherwise `/regions` and `/sales` would be
 * swallowed by the scopes with the same prefix.
 */
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(navigation::index)
        .service(navigation::about)
        .service(navigation::sales)
        .service(navigation::reports)
        .service(navigation::visualization)
        .service(navigation::regions)
        .service(
            web::scope("/regions")
                .service(endpoints::regions_list)
                .service(endpoints::region_add_form)
                .service(endpoints::region_add)
                .service(endpoints::region_edit_form)
                .service(endpoints::region_update)
                .service(endpoints::region_delete),
        )
        .service(
            web::scope("/sales")
                .service(endpoints::sales_data_list)
                .service(endpoints::sales_data_add_form)
                .service(endpoints::sales_data_add)
                .service(endpoints::sales_data_edit_form)
                .service(endpoints::sales_data_update)
                .service(endpoints::sales_data_delete)
                .service(reports::sales_report)
                .service(reports::sales_visualization),
        );
}

#[cfg(test)]
mod test {
    use actix_web::{
        App,
        http::{StatusCode, header},
        test,
    };

    use super::*;
    use crate::api::state::AppState;

    macro_rules! init_app {
        () => {
            test::init_service(App::new().app_data(web::Data::new(AppState::with_connection_pool(None))).configure(configure_routes)).await
        };
    }

    #[actix_web::test]
    async fn test_top_level_redirects() {
        let app = init_app!();
        for (path, location) in [
            ("/sales", navigation::SALES_LIST_PATH),
            ("/reports", navigation::REPORTS_PATH),
            ("/visualization", navigation::VISUALIZATION_PATH),
            ("/regions", navigation::REGIONS_LIST_PATH),
        ] {
            let response = test::call_service(&app, test::TestRequest::get().uri(path).to_request()).await;
            assert_eq!(response.status(), StatusCode::FOUND, "status for {path}");
            assert_eq!(response.headers().get(header::LOCATION).unwrap(), location, "location for {path}");
        }
    }

    #[actix_web::test]
    async fn test_static_pages() {
        let app = init_app!();
        for path in ["/", "/about", "/regions/add_region"] {
            let response = test::call_service(&app, test::TestRequest::get().uri(path).to_request()).await;
            assert_eq!(response.status(), StatusCode::OK, "status for {path}");
        }
    }

    #[actix_web::test]
    async fn test_database_unavailable() {
        let app = init_app!();
        for path in [navigation::REGIONS_LIST_PATH, navigation::SALES_LIST_PATH, navigation::REPORTS_PATH, navigation::VISUALIZATION_PATH] {
            let response = test::call_service(&app, test::TestRequest::get().uri(path).to_request()).await;
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR, "status for {path}");
        }
    }

    #[actix_web::test]
    async fn test_add_sales_data_rejects_invalid_amount() {
        let app = init_app!();
        let request = test::TestRequest::post().uri("/sales/add_sales_data").set_form([("monthly_amount", "abc"), ("date", "2024-01-15"), ("region", "1")]).to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = test::read_body(response).await;
        assert!(String::from_utf8(body.to_vec()).unwrap().contains("Monthly amount must be a number"));
    }

    #[actix_web::test]
    async fn test_update_sales_data_rejects_invalid_date() {
        let app = init_app!();
        let request = test::TestRequest::post().uri("/sales/edit_sales_data/1").set_form([("monthly_amount", "10"), ("date", "not a date"), ("region", "1")]).to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_non_numeric_id_is_not_found() {
        let app = init_app!();
        let response = test::call_service(&app, test::TestRequest::get().uri("/regions/edit_region/abc").to_request()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let response = test::call_service(&app, test::TestRequest::post().uri("/sales/delete_sales_data/abc").to_request()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_unknown_route_is_not_found() {
        let app = init_app!();
        let response = test::call_service(&app, test::TestRequest::get().uri("/nothing/here").to_request()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
