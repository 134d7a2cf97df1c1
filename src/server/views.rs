//! Server-rendered HTML pages.
//!
//! Pages are plain strings built with `write!`; every value that comes from
//! the database or the request goes through [`escape`].

use std::fmt::Write;

use axum::http::StatusCode;
use toolcrib_db::models::{Event, Tool};

use super::auth::Flash;

const BOOTSTRAP_CSS: &str =
    "https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/css/bootstrap.min.css";

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}

fn or_dash(s: &str) -> String {
    if s.is_empty() {
        "-".to_string()
    } else {
        escape(s)
    }
}

fn layout(flash: Option<&Flash>, nav: bool, content: &str) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Tool inventory</title>
    <link href="{css}" rel="stylesheet">
  </head>
  <body>
  <nav class="navbar navbar-expand-lg navbar-dark bg-dark">
    <div class="container-fluid">
      <a class="navbar-brand" href="/">Tools</a>
"#,
        css = BOOTSTRAP_CSS
    );
    if nav {
        html.push_str(
            r#"      <div class="d-flex gap-2">
        <a class="btn btn-sm btn-outline-light" href="/tool/new">+ Add</a>
        <a class="btn btn-sm btn-outline-warning" href="/logout">Log out</a>
      </div>
"#,
        );
    }
    html.push_str("    </div>\n  </nav>\n  <main class=\"container py-4\">\n");
    if let Some(flash) = flash {
        let _ = writeln!(
            html,
            r#"    <div class="alert alert-{}">{}</div>"#,
            escape(&flash.level),
            escape(&flash.message)
        );
    }
    html.push_str(content);
    html.push_str("\n  </main>\n  </body>\n</html>\n");
    html
}

pub fn login_page(error: Option<&str>) -> String {
    let mut body = String::from(
        r#"<div class="container py-5" style="max-width:480px;">
  <div class="card shadow-sm">
    <div class="card-body">
      <h1 class="h4 mb-3">Log in</h1>
"#,
    );
    if let Some(error) = error {
        let _ = writeln!(
            body,
            r#"      <div class="alert alert-danger">{}</div>"#,
            escape(error)
        );
    }
    body.push_str(
        r#"      <form method="post">
        <div class="mb-3">
          <label class="form-label">Administrator password</label>
          <input type="password" name="password" class="form-control" required>
        </div>
        <button class="btn btn-primary w-100">Log in</button>
      </form>
    </div>
  </div>
</div>"#,
    );
    layout(None, false, &body)
}

fn select_options(html: &mut String, values: &[String], selected: &str) {
    for value in values {
        let _ = writeln!(
            html,
            r#"        <option value="{v}"{sel}>{v}</option>"#,
            v = escape(value),
            sel = if value == selected { " selected" } else { "" }
        );
    }
}

/// Current filter values of the tool list.
#[derive(Debug, Default)]
pub struct ListFilter<'a> {
    pub q: &'a str,
    pub cat: &'a str,
    pub holder: &'a str,
}

pub fn index_page(
    tools: &[Tool],
    categories: &[String],
    holders: &[String],
    filter: &ListFilter<'_>,
    flash: Option<&Flash>,
) -> String {
    let mut body = String::new();
    let _ = write!(
        body,
        r#"<form class="row gy-2 gx-2 align-items-end mb-3">
  <div class="col-12 col-md-5">
    <label class="form-label">Search</label>
    <input class="form-control" name="q" value="{}" placeholder="name / description / serial number">
  </div>
  <div class="col-6 col-md-3">
    <label class="form-label">Category</label>
    <select class="form-select" name="cat">
        <option value="">(all)</option>
"#,
        escape(filter.q)
    );
    select_options(&mut body, categories, filter.cat);
    body.push_str(
        r#"    </select>
  </div>
  <div class="col-6 col-md-2">
    <label class="form-label">Holder</label>
    <select class="form-select" name="holder">
        <option value="">(everyone)</option>
"#,
    );
    select_options(&mut body, holders, filter.holder);
    body.push_str(
        r#"    </select>
  </div>
  <div class="col-12 col-md-2">
    <button class="btn btn-primary w-100">Filter</button>
  </div>
</form>
<div class="row g-3">
"#,
    );

    if tools.is_empty() {
        body.push_str(
            r#"  <div class="col-12"><div class="alert alert-info">No results.</div></div>
"#,
        );
    }

    for tool in tools {
        body.push_str(
            r#"  <div class="col-12 col-md-6 col-lg-4">
    <div class="card h-100 shadow-sm">
"#,
        );
        if !tool.photo_path.is_empty() {
            let _ = writeln!(
                body,
                r#"      <img src="{}" class="card-img-top" alt="{}" style="object-fit:cover; height:200px;">"#,
                escape(&tool.photo_path),
                escape(&tool.name)
            );
        }
        let serial = if tool.serial_no.is_empty() {
            String::new()
        } else {
            format!(" &bull; SN: {}", escape(&tool.serial_no))
        };
        let badge = if tool.is_checked_out() {
            format!(
                r#"<span class="badge bg-danger">With {} since {}</span>"#,
                escape(&tool.holder),
                escape(&tool.checkout_date)
            )
        } else {
            r#"<span class="badge bg-success">Available</span>"#.to_string()
        };
        let _ = write!(
            body,
            r#"      <div class="card-body">
        <h5 class="card-title">{name}</h5>
        <p class="card-text small text-muted mb-2">{category}{serial}</p>
        {badge}
      </div>
      <div class="card-footer d-flex gap-2">
        <a class="btn btn-sm btn-outline-primary" href="/tool/{id}">Open</a>
      </div>
    </div>
  </div>
"#,
            name = escape(&tool.name),
            category = escape(&tool.category),
            serial = serial,
            badge = badge,
            id = tool.id,
        );
    }
    body.push_str("</div>");

    layout(flash, true, &body)
}

fn tool_fields(html: &mut String, tool: Option<&Tool>) {
    let value = |f: fn(&Tool) -> &str| tool.map(|t| escape(f(t))).unwrap_or_default();
    let _ = write!(
        html,
        r#"  <div class="col-12">
    <label class="form-label">Name*</label>
    <input class="form-control" name="name" value="{name}" required>
  </div>
  <div class="col-12">
    <label class="form-label">Description</label>
    <textarea class="form-control" name="description" rows="3">{description}</textarea>
  </div>
  <div class="col-md-6">
    <label class="form-label">Category</label>
    <input class="form-control" name="category" value="{category}" placeholder="e.g. power tools">
  </div>
  <div class="col-md-6">
    <label class="form-label">Serial number</label>
    <input class="form-control" name="serial_no" value="{serial_no}">
  </div>
"#,
        name = value(|t| t.name.as_str()),
        description = value(|t| t.description.as_str()),
        category = value(|t| t.category.as_str()),
        serial_no = value(|t| t.serial_no.as_str()),
    );
}

pub fn new_tool_page() -> String {
    let mut body = String::from(
        r#"<h1 class="h4 mb-3">Add tool</h1>
<form method="post" enctype="multipart/form-data" class="row g-3">
"#,
    );
    tool_fields(&mut body, None);
    body.push_str(
        r#"  <div class="col-12">
    <label class="form-label">Photo</label>
    <input class="form-control" type="file" name="photo" accept="image/*">
  </div>
  <div class="col-12">
    <button class="btn btn-primary">Save</button>
    <a class="btn btn-light" href="/">Cancel</a>
  </div>
</form>"#,
    );
    layout(None, true, &body)
}

pub fn edit_tool_page(tool: &Tool) -> String {
    let mut body = String::new();
    let _ = write!(
        body,
        r#"<h1 class="h4 mb-3">Edit: {}</h1>
<form method="post" enctype="multipart/form-data" class="row g-3">
"#,
        escape(&tool.name)
    );
    tool_fields(&mut body, Some(tool));
    let _ = write!(
        body,
        r#"  <div class="col-12">
    <label class="form-label">Photo (optional)</label>
    <input class="form-control" type="file" name="photo" accept="image/*">
  </div>
  <div class="col-12">
    <button class="btn btn-primary">Save changes</button>
    <a class="btn btn-light" href="/tool/{}">Back</a>
  </div>
</form>"#,
        tool.id
    );
    layout(None, true, &body)
}

pub fn tool_detail_page(tool: &Tool, events: &[Event], today: &str, flash: Option<&Flash>) -> String {
    let mut body = String::new();
    let _ = write!(
        body,
        r#"<div class="row g-3">
  <div class="col-lg-8">
    <div class="card shadow-sm">
      <div class="card-body">
        <div class="d-flex justify-content-between align-items-start mb-2">
          <h1 class="h4 mb-0">{name}</h1>
          <a class="btn btn-sm btn-outline-secondary" href="/tool/{id}/edit">Edit</a>
        </div>
        <p class="text-muted small mb-2">Category: {category} &bull; SN: {serial}</p>
"#,
        name = escape(&tool.name),
        id = tool.id,
        category = or_dash(&tool.category),
        serial = or_dash(&tool.serial_no),
    );
    if !tool.photo_path.is_empty() {
        let _ = writeln!(
            body,
            r#"        <img src="{}" class="rounded mb-3" style="max-height:320px; object-fit:cover;">"#,
            escape(&tool.photo_path)
        );
    }
    let _ = writeln!(body, "        <p>{}</p>", escape(&tool.description));

    if tool.is_checked_out() {
        let _ = write!(
            body,
            r#"        <div class="alert alert-warning d-flex justify-content-between align-items-center">
          <div><strong>Checked out:</strong> {holder} since {date}</div>
          <form method="post" action="/tool/{id}/return">
            <button class="btn btn-sm btn-success">Accept return</button>
          </form>
        </div>
"#,
            holder = escape(&tool.holder),
            date = escape(&tool.checkout_date),
            id = tool.id,
        );
    } else {
        let _ = write!(
            body,
            r#"        <form class="row g-2" method="post" action="/tool/{id}/checkout">
          <div class="col-md-5">
            <label class="form-label">Taken by</label>
            <input class="form-control" name="person" placeholder="e.g. Jane Smith" required>
          </div>
          <div class="col-md-4">
            <label class="form-label">Checkout date</label>
            <input class="form-control" type="date" name="date" value="{today}">
          </div>
          <div class="col-md-3 align-self-end">
            <button class="btn btn-primary w-100">Check out</button>
          </div>
        </form>
"#,
            id = tool.id,
            today = escape(today),
        );
    }
    body.push_str(
        r#"      </div>
    </div>
  </div>
  <div class="col-lg-4">
    <div class="card shadow-sm mb-3">
      <div class="card-body">
        <h6 class="mb-2">QR tool card</h6>
"#,
    );
    if tool.qr_path.is_empty() {
        body.push_str("        <p class=\"text-muted\">No QR code.</p>\n");
    } else {
        let _ = write!(
            body,
            r#"        <img src="{}" class="img-fluid" alt="QR">
        <p class="small text-muted mt-2">Scan to open this page.</p>
"#,
            escape(&tool.qr_path)
        );
    }
    body.push_str(
        r#"      </div>
    </div>
    <div class="card shadow-sm">
      <div class="card-body">
        <h6 class="mb-2">History</h6>
"#,
    );
    if events.is_empty() {
        body.push_str("        <p class=\"text-muted\">No events.</p>\n");
    } else {
        body.push_str("        <ul class=\"list-group list-group-flush\">\n");
        for event in events {
            let _ = write!(
                body,
                r#"          <li class="list-group-item d-flex justify-content-between align-items-center">
            <span>{label} <span class="text-muted">{person}</span></span>
            <span class="small text-muted">{when}</span>
          </li>
"#,
                label = event.kind.label(),
                person = escape(&event.person),
                when = event.occurred_at.format("%Y-%m-%d %H:%M"),
            );
        }
        body.push_str("        </ul>\n");
    }
    body.push_str(
        r#"      </div>
    </div>
  </div>
</div>"#,
    );

    layout(flash, true, &body)
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    let body = format!(
        r#"<h1 class="h4 mb-3">{} {}</h1>
<p>{}</p>
<a class="btn btn-light" href="/">Back to the list</a>"#,
        status.as_u16(),
        status.canonical_reason().unwrap_or("Error"),
        escape(message)
    );
    layout(None, true, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use toolcrib_common::ToolId;

    fn tool() -> Tool {
        Tool {
            id: ToolId::from(3),
            name: "Drill <XL>".to_string(),
            description: String::new(),
            category: "power".to_string(),
            serial_no: String::new(),
            photo_path: String::new(),
            holder: String::new(),
            checkout_date: String::new(),
            qr_path: "/uploads/qr_tool_3.png".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#x27;&amp;&#x27;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_index_escapes_and_marks_selection() {
        let html = index_page(
            &[tool()],
            &["power".to_string(), "hand".to_string()],
            &[],
            &ListFilter {
                cat: "power",
                ..Default::default()
            },
            None,
        );
        assert!(html.contains("Drill &lt;XL&gt;"));
        assert!(html.contains(r#"<option value="power" selected>"#));
        assert!(html.contains(r#"<option value="hand">"#));
        assert!(html.contains("Available"));
    }

    #[test]
    fn test_detail_shows_checkout_form_or_return() {
        let mut t = tool();
        let html = tool_detail_page(&t, &[], "2024-05-01", None);
        assert!(html.contains("/tool/3/checkout"));
        assert!(html.contains(r#"value="2024-05-01""#));

        t.holder = "Jane".to_string();
        t.checkout_date = "2024-05-01".to_string();
        let html = tool_detail_page(&t, &[], "2024-05-02", Some(&Flash::success("Done.")));
        assert!(html.contains("/tool/3/return"));
        assert!(html.contains("alert-success"));
    }
}
