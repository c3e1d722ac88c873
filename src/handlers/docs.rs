//! Interactive documentation pages.
//!
//! These routes are registered outside the OpenAPI wrapper so they do not
//! appear in the generated document.

use actix_web::{HttpResponse, http::header};

const DOCS_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Profile API - Interactive API Documentation</title>
    <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
    <style>
        body {
            margin: 0;
            background: #fff7fb;
        }
        .swagger-ui .topbar {
            background: #d63384;
        }
        .swagger-ui .info .title {
            color: #a61e67;
        }
        .swagger-ui .opblock.opblock-get .opblock-summary-method {
            background: #d63384;
        }
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script>
        window.ui = SwaggerUIBundle({
            url: '/openapi.json',
            dom_id: '#swagger-ui',
            docExpansion: 'list',
            defaultModelsExpandDepth: 2,
            defaultModelExpandDepth: 2,
            displayRequestDuration: true,
            filter: true,
            showExtensions: true,
            showCommonExtensions: true
        });
    </script>
</body>
</html>"##;

/// Swagger UI bound to the generated OpenAPI document
pub async fn docs() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(DOCS_HTML)
}

/// Send visitors of the bare host to the documentation
pub async fn root() -> HttpResponse {
    HttpResponse::TemporaryRedirect()
        .insert_header((header::LOCATION, "/docs"))
        .finish()
}
