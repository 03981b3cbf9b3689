//! Server-rendered pages.
//!
//! Every page shares one layout and stylesheet. Markup, styles and script
//! live in string constants so the binary has no template files to ship.
//!
//! - `dashboard`: live balance over `/ws`
//! - `login`: username/password form
//! - `configure`: exchange API key form

pub mod configure;
pub mod dashboard;
pub mod login;

/// Styles shared by every page.
const STYLES: &str = r"
* { box-sizing: border-box; margin: 0; padding: 0; }

:root {
    --bg: #0d1117;
    --card: #161b22;
    --border: #30363d;
    --text: #c9d1d9;
    --text-dim: #8b949e;
    --green: #3fb950;
    --red: #f85149;
    --blue: #58a6ff;
}

body {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
    background: var(--bg);
    color: var(--text);
    padding: 20px;
    min-height: 100vh;
}

.container { max-width: 720px; margin: 0 auto; }

header {
    display: flex;
    justify-content: space-between;
    align-items: center;
    margin-bottom: 24px;
    padding-bottom: 16px;
    border-bottom: 1px solid var(--border);
}

header h1 { font-size: 22px; }
nav a { color: var(--blue); margin-left: 16px; text-decoration: none; }
nav a:hover { text-decoration: underline; }

.card {
    background: var(--card);
    border: 1px solid var(--border);
    border-radius: 8px;
    padding: 20px;
    margin-bottom: 16px;
}

.card-title {
    font-size: 13px;
    color: var(--text-dim);
    text-transform: uppercase;
    letter-spacing: 0.5px;
}

.card-value { font-size: 36px; font-weight: 600; margin-top: 8px; }
.card-value.up { color: var(--green); }
.card-value.down { color: var(--red); }

.muted { color: var(--text-dim); font-size: 13px; margin-top: 8px; }

form label { display: block; margin: 12px 0 4px; color: var(--text-dim); font-size: 13px; }

form input {
    width: 100%;
    padding: 8px 10px;
    background: var(--bg);
    border: 1px solid var(--border);
    border-radius: 6px;
    color: var(--text);
}

.btn {
    margin-top: 16px;
    padding: 8px 16px;
    border: none;
    border-radius: 6px;
    background: var(--blue);
    color: var(--bg);
    font-weight: 600;
    cursor: pointer;
}

.status-dot {
    display: inline-block;
    width: 8px;
    height: 8px;
    border-radius: 50%;
    background: var(--red);
    margin-right: 6px;
}

.status-dot.live { background: var(--green); }
";

/// Wrap `body` (and optional inline `script`) in the shared layout.
pub(crate) fn layout(title: &str, body: &str, script: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>
{styles}
    </style>
</head>
<body>
    <div class="container">
        <header>
            <h1>{title}</h1>
            <nav><a href="/">Dashboard</a><a href="/login">Login</a><a href="/config">Configuration</a></nav>
        </header>
{body}
    </div>
    <script>
{script}
    </script>
</body>
</html>"#,
        styles = STYLES,
    )
}

/// Minimal HTML escaping for values echoed into markup.
pub(crate) fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
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
