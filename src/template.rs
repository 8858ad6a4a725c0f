//! HTML rendering of the Swagger UI entry page.
//!
//! The page template is bundled into the crate and rendered with `minijinja`.
//! Its context carries the page title, the route prefix the browser uses to
//! build asset URLs, and the complete per-request configuration, which the page
//! embeds as JSON for the client-side `SwaggerUIBundle` call.

use crate::error::Result;
use crate::options::UiConfig;
use log::debug;
use minijinja::Environment;
use serde::Serialize;

/// Name the bundled template is registered under. The `.html` suffix turns on
/// HTML auto-escaping.
pub const INDEX_TEMPLATE_NAME: &str = "index.html";

const INDEX_TEMPLATE: &str = include_str!("../templates/index.html");

/// Values available to the page template.
#[derive(Debug, Serialize)]
pub struct RenderContext<'a> {
    pub title: &'a str,
    pub route: &'a str,
    pub options: &'a UiConfig,
}

impl<'a> RenderContext<'a> {
    /// Builds the context from a per-request configuration.
    pub fn new(options: &'a UiConfig) -> Self {
        Self {
            title: &options.title,
            route: &options.route_prefix,
            options,
        }
    }
}

/// Renders the bundled page template.
#[derive(Debug)]
pub struct TemplateRenderer {
    env: Environment<'static>,
}

impl TemplateRenderer {
    /// Creates a renderer with the bundled template loaded.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::TemplateError`] if the template does not compile.
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.add_template(INDEX_TEMPLATE_NAME, INDEX_TEMPLATE)?;
        Ok(Self { env })
    }

    /// Renders the page for the given context.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::TemplateError`] if rendering fails.
    pub fn render(&self, context: &RenderContext<'_>) -> Result<String> {
        debug!(
            "Rendering {} for route '{}'",
            INDEX_TEMPLATE_NAME, context.route
        );
        let template = self.env.get_template(INDEX_TEMPLATE_NAME)?;
        Ok(template.render(context)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::UiOptions;
    use serde_json::{json, Value};

    fn render(options: UiOptions, route: &str) -> String {
        let config = options.build().unwrap().with_route_prefix(route);
        let renderer = TemplateRenderer::new().unwrap();
        let html = renderer.render(&RenderContext::new(&config)).unwrap();
        // Auto-escaping writes `/` in attribute values as `&#x2f;`
        html.replace("&#x2f;", "/")
    }

    /// Extracts the JSON object assigned to `var options` in the page script
    fn embedded_options(html: &str) -> Value {
        let start = html.find("var options = ").unwrap() + "var options = ".len();
        let end = start + html[start..].find(";\n").unwrap();
        serde_json::from_str(&html[start..end]).unwrap()
    }

    #[test]
    fn test_render_title() {
        let html = render(UiOptions::new().title("Inventory API"), "/docs/");
        assert!(html.contains("<title>Inventory API</title>"));
    }

    #[test]
    fn test_title_is_escaped() {
        let html = render(UiOptions::new().title("<b>API</b>"), "/docs/");
        assert!(!html.contains("<title><b>API</b></title>"));
        assert!(html.contains("&lt;b&gt;API&lt;"));
    }

    #[test]
    fn test_embedded_options() {
        let html = render(
            UiOptions::new().swagger_option("docExpansion", json!("list")),
            "/docs/",
        );
        let options = embedded_options(&html);

        assert_eq!(options["routePrefix"], "/docs/");
        assert_eq!(options["swaggerOptions"]["dom_id"], "#swagger-ui");
        assert_eq!(options["swaggerOptions"]["docExpansion"], "list");
        assert_eq!(
            options["swaggerOptions"]["url"],
            "http://petstore.swagger.io/v2/swagger.json"
        );
    }

    #[test]
    fn test_script_payload_cannot_close_tag() {
        let html = render(
            UiOptions::new().swagger_option("filter", json!("</script><script>")),
            "/docs/",
        );
        let options = embedded_options(&html);

        assert_eq!(options["swaggerOptions"]["filter"], "</script><script>");
        assert_eq!(html.matches("</script>").count(), 3);
    }

    #[test]
    fn test_hide_topbar() {
        let shown = render(UiOptions::new(), "/docs/");
        let hidden = render(UiOptions::new().hide_topbar(true), "/docs/");

        assert!(!shown.contains("hide-topbar"));
        assert!(hidden.contains("class=\"hide-topbar\""));
    }

    #[test]
    fn test_mount_element_uses_dom_id() {
        let html = render(UiOptions::new().dom_id("#api-docs"), "/docs/");
        assert!(html.contains("<div id=\"api-docs\"></div>"));
    }

    #[test]
    fn test_assets_served_locally_by_default() {
        let html = render(UiOptions::new(), "/docs/");

        assert!(html.contains("href=\"/docs/swagger-ui.css\""));
        assert!(html.contains("src=\"/docs/swagger-ui-bundle.js\""));
        assert!(html.contains("src=\"/docs/swagger-ui-standalone-preset.js\""));
        assert!(!html.contains("unpkg.com"));
    }

    #[test]
    fn test_assets_from_cdn() {
        let html = render(
            UiOptions::new().assets_url("https://unpkg.com/swagger-ui-dist@5/"),
            "/docs/",
        );

        assert!(html.contains("unpkg.com"));
        assert!(html.contains("swagger-ui-bundle.js"));
        assert!(!html.contains("src=\"/docs/swagger-ui-bundle.js\""));
        // The crate's own stylesheet always comes from the served directory
        assert!(html.contains("href=\"/docs/index.css\""));
    }
}
