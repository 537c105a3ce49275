use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;

/// All routes of the API
pub fn configure_routes() -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/me", get(handlers::auth::current_user))
        // CRUD of every registered table; the segment may carry a suffix
        // such as `continents.tera`
        .route(
            "/:table/items",
            get(handlers::table_items::list_page)
                .post(handlers::table_items::insert)
                .put(handlers::table_items::update)
                .delete(handlers::table_items::delete),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::auth::jwt;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use tower::ServiceExt;

    fn request(method: Method, uri: &str, token: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn guest_token() -> String {
        let _ = jwt::install_secret("routes-test-secret".to_string());
        let secret = jwt::secret().unwrap();
        jwt::generate_access_token("guest", false, secret).unwrap()
    }

    #[tokio::test]
    async fn test_anonymous_requests_are_unauthorized() {
        let _ = guest_token();
        for (method, body) in [
            (Method::GET, ""),
            (Method::POST, r#"{"name": "Asia"}"#),
            (Method::PUT, r#"{"old": {"name": "Asia"}, "new": {"name": "Asia"}}"#),
            (Method::DELETE, r#"{"name": "Asia"}"#),
        ] {
            let uri = if method == Method::GET {
                "/continents/items?page_index=1&page_size=10"
            } else {
                "/continents/items"
            };
            let response = configure_routes()
                .oneshot(request(method.clone(), uri, None, body))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", method);
        }

        let me = configure_routes()
            .oneshot(request(Method::GET, "/auth/me", None, ""))
            .await
            .unwrap();
        assert_eq!(me.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_non_admin_cannot_update_or_delete() {
        let token = guest_token();
        let update = configure_routes()
            .oneshot(request(
                Method::PUT,
                "/continents/items",
                Some(&token),
                r#"{"old": {"name": "Asia", "area_m2": 1.0}, "new": {"name": "Asia", "area_m2": 2.0}}"#,
            ))
            .await
            .unwrap();
        assert_eq!(update.status(), StatusCode::UNAUTHORIZED);

        let delete = configure_routes()
            .oneshot(request(
                Method::DELETE,
                "/continents/items",
                Some(&token),
                r#"{"name": "Asia", "area_m2": 1.0}"#,
            ))
            .await
            .unwrap();
        assert_eq!(delete.status(), StatusCode::UNAUTHORIZED);
    }
}
