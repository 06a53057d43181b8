//! # Page Rendering
//!
//! Server-side HTML for the products page: search bar, add-product dialog,
//! pending toasts and the product grid.

use justpos_core::catalog::{AddProductForm, FormField, InputType, ProductCard, Toast};
use std::fmt::Write;

/// Everything the products page shows
pub struct PageModel<'a> {
    pub cards: &'a [ProductCard],
    pub form: &'a AddProductForm,
    pub toasts: &'a [Toast],
    pub error: Option<&'a str>,
}

fn escape(raw: &str) -> String {
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

pub fn render_page(model: &PageModel<'_>) -> String {
    let mut html = String::new();

    html.push_str(concat!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n",
        "<meta charset=\"utf-8\">\n",
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n",
        "<title>Products | JustPOS</title>\n",
        "<link rel=\"stylesheet\" href=\"/styles.css\">\n",
        "</head>\n<body>\n<main class=\"page\">\n",
    ));

    // Not wired to any filtering
    html.push_str(concat!(
        "<div class=\"search\">",
        "<input type=\"text\" placeholder=\"search items\">",
        "<button type=\"button\">Search</button>",
        "</div>\n",
    ));

    render_toasts(&mut html, model.toasts);
    if let Some(error) = model.error {
        let _ = writeln!(html, "<div class=\"error\" role=\"alert\">{}</div>", escape(error));
    }
    render_form(&mut html, model.form);
    render_grid(&mut html, model.cards);

    html.push_str("</main>\n</body>\n</html>\n");
    html
}

fn render_toasts(html: &mut String, toasts: &[Toast]) {
    if toasts.is_empty() {
        return;
    }
    html.push_str("<ol class=\"toasts\">\n");
    for toast in toasts {
        let _ = writeln!(
            html,
            "<li class=\"toast\" role=\"status\"><strong>{}</strong><p>{}</p></li>",
            escape(&toast.title),
            escape(&toast.description)
        );
    }
    html.push_str("</ol>\n");
}

fn render_form(html: &mut String, form: &AddProductForm) {
    let open = if form.issues().is_some() { " open" } else { "" };
    let _ = writeln!(html, "<details class=\"dialog\"{}>", open);
    html.push_str(concat!(
        "<summary class=\"button\">Add product</summary>\n",
        "<div class=\"dialog-content\">\n",
        "<h2>Add a product</h2>\n",
        "<p class=\"muted\">Adding a product makes it available to be purchased or added to cart</p>\n",
        "<form method=\"post\" action=\"/products\">\n",
    ));

    for field in FormField::ALL {
        let name = field.name();
        let _ = writeln!(html, "<div class=\"field\">");
        let _ = writeln!(html, "<label for=\"{}\">{}</label>", name, field.label());

        let mut input = format!(
            "<input id=\"{}\" name=\"{}\" type=\"{}\"",
            name,
            name,
            field.input_type().as_str()
        );
        if let Some(placeholder) = field.placeholder() {
            let _ = write!(input, " placeholder=\"{}\"", placeholder);
        }
        // Browsers refuse a preset value on file inputs
        if field.input_type() != InputType::File {
            if let Some(value) = form.text(field) {
                let _ = write!(input, " value=\"{}\"", escape(value));
            }
        }
        if field.required_attr() {
            input.push_str(" required");
        }
        input.push('>');
        html.push_str(&input);
        html.push('\n');

        let _ = writeln!(html, "<p class=\"muted\">{}</p>", field.description());
        if let Some(issue) = form.issues().and_then(|i| i.for_field(field)) {
            let _ = writeln!(html, "<p class=\"message\">{}</p>", escape(&issue.to_string()));
        }
        html.push_str("</div>\n");
    }

    html.push_str("<button type=\"submit\">Submit</button>\n</form>\n</div>\n</details>\n");
}

fn render_grid(html: &mut String, cards: &[ProductCard]) {
    html.push_str("<div class=\"grid\">\n");
    for card in cards {
        let _ = writeln!(html, "<div class=\"card\" data-key=\"{}\">", card.key);
        let _ = writeln!(html, "<div class=\"image\"><span>{}</span></div>", card.image_placeholder);
        html.push_str("<div class=\"badges\">");
        for badge in card.badges {
            let _ = write!(html, "<span class=\"badge\">{}</span>", badge);
        }
        html.push_str("</div>\n");
        let _ = writeln!(
            html,
            "<div class=\"row\"><span>{}</span><span>{}</span></div>",
            escape(&card.name),
            escape(&card.price_label)
        );
        let _ = writeln!(html, "<span>{}</span>", escape(&card.stock_label));
        html.push_str("</div>\n");
    }
    html.push_str("</div>\n");
}
