/// Version of the `@pydantic/fastui-prebuilt` bundle loaded by the shell page.
pub const PREBUILT_VERSION: &str = "0.0.23";
const CDN_BASE: &str = "https://cdn.jsdelivr.net/npm/@pydantic/fastui-prebuilt";

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// HTML document that boots the prebuilt FastUI client from its CDN.
/// The client then fetches `/api{path}` for whatever path the browser is on.
pub fn prebuilt_html(title: &str) -> String {
    format!(
        r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="UTF-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1.0" />
    <title>{title}</title>
    <script type="module" crossorigin src="{base}@{ver}/dist/assets/index.js"></script>
    <link rel="stylesheet" crossorigin href="{base}@{ver}/dist/assets/index.css">
    <meta name="fastui:APIRootUrl" content="/api" />
  </head>
  <body>
    <div id="root"></div>
  </body>
</html>
"#,
        title = escape_html(title),
        base = CDN_BASE,
        ver = PREBUILT_VERSION,
    )
}
