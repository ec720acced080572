// Paginated HTML catalogue: one A4 page per product, print-ready

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use vitrine_core::{CataloguePage, ExportOptions, ImageAsset};

use crate::error::IoError;

const STYLE: &str = r#"
@page { size: A4; margin: 0; }
* { box-sizing: border-box; }
body { margin: 0; font-family: Helvetica, Arial, sans-serif; background: #f3f4f6; }
.page { position: relative; width: 210mm; height: 297mm; margin: 0 auto 24px; padding: 40px;
        background: #ffffff; display: flex; flex-direction: column; page-break-after: always; }
.page:last-child { page-break-after: auto; }
.logo { position: absolute; top: 20px; left: 40px; width: 60px; height: 60px; object-fit: contain; }
.product { flex-grow: 1; display: flex; flex-direction: column; align-items: center; justify-content: center; }
.image { width: 100%; height: 400px; margin-bottom: 20px; display: flex; align-items: center; justify-content: center; }
.image img { max-width: 100%; max-height: 100%; object-fit: contain; }
.title { font-size: 24px; font-weight: bold; text-transform: uppercase; margin: 0 0 10px; text-align: center; }
.separator { width: 60px; height: 2px; background: #000000; margin-bottom: 15px; }
.row { font-size: 10px; margin-bottom: 5px; }
.label { color: #666666; font-weight: bold; margin-right: 5px; }
.description { font-size: 10px; color: #444444; text-align: center; max-width: 80%; line-height: 1.4; margin-top: 5px; }
.price { margin-top: 20px; border: 1pt solid #000000; padding: 8px 20px; font-size: 14px; font-weight: bold; }
.enquiry { margin-top: 15px; background: #25d366; color: #ffffff; padding: 12px 30px; border-radius: 8px;
           font-size: 11px; font-weight: bold; text-decoration: none; }
@media print { body { background: none; } .page { margin: 0; } }
"#;

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

fn data_uri(image: &ImageAsset) -> String {
    format!("data:{};base64,{}", image.media_type, STANDARD.encode(&image.bytes))
}

/// Render pages into a single self-contained HTML document.
pub fn render_html(pages: &[CataloguePage], options: &ExportOptions) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>Catalogue</title>\n<style>");
    html.push_str(STYLE);
    html.push_str("</style>\n</head>\n<body>\n");

    let logo = options.logo.as_deref().map(data_uri);

    for page in pages {
        // Writing into a String cannot fail.
        let _ = write_page(&mut html, page, logo.as_deref());
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn write_page(html: &mut String, page: &CataloguePage, logo: Option<&str>) -> std::fmt::Result {
    writeln!(html, "<section class=\"page\" id=\"page-{}\">", page.page_number)?;
    if let Some(logo) = logo {
        writeln!(html, "  <img class=\"logo\" src=\"{logo}\" alt=\"\">")?;
    }
    writeln!(html, "  <div class=\"product\">")?;

    writeln!(html, "    <div class=\"image\">")?;
    if let Some(image) = page.image.as_deref() {
        writeln!(
            html,
            "      <img src=\"{}\" alt=\"{}\">",
            data_uri(image),
            escape_html(&image.filename)
        )?;
    }
    writeln!(html, "    </div>")?;

    writeln!(html, "    <h1 class=\"title\">{}</h1>", escape_html(&page.title))?;
    writeln!(html, "    <div class=\"separator\"></div>")?;

    if let Some(material) = &page.material {
        writeln!(
            html,
            "    <div class=\"row\"><span class=\"label\">MATERIAL:</span><span>{}</span></div>",
            escape_html(material)
        )?;
    }
    if let Some(description) = &page.description {
        writeln!(html, "    <p class=\"description\">{}</p>", escape_html(description))?;
    }
    if let Some(price) = &page.price_label {
        writeln!(html, "    <div class=\"price\">{}</div>", escape_html(price))?;
    }
    writeln!(
        html,
        "    <a class=\"enquiry\" href=\"{}\">WhatsApp Enquiry</a>",
        escape_html(&page.contact_link)
    )?;

    writeln!(html, "  </div>")?;
    writeln!(html, "</section>")
}

pub fn write_html(pages: &[CataloguePage], options: &ExportOptions, path: &Path) -> Result<(), IoError> {
    fs::write(path, render_html(pages, options)).map_err(|source| IoError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), pages = pages.len(), "wrote HTML catalogue");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use vitrine_core::{project, ImageAsset, Product, ProductId, ProductSource};

    fn product(title: &str, price: &str, description: &str) -> Product {
        Product {
            id: ProductId::generate(),
            image: Some(Arc::new(ImageAsset::new("p.png", "image/png", vec![1u8, 2, 3]))),
            title: title.into(),
            price: price.into(),
            material: String::new(),
            description: description.into(),
            source: ProductSource::Manual,
        }
    }

    #[test]
    fn one_section_per_page() {
        let options = ExportOptions::default();
        let pages = project(&[product("A", "1", ""), product("B", "", "")], &options);
        let html = render_html(&pages, &options);
        assert_eq!(html.matches("<section class=\"page\"").count(), 2);
        assert!(html.contains("id=\"page-2\""));
        assert!(html.contains("data:image/png;base64,AQID"));
    }

    #[test]
    fn optional_fields_only_when_present() {
        let options = ExportOptions::default();
        let pages = project(&[product("A", "", "")], &options);
        let html = render_html(&pages, &options);
        assert!(!html.contains("MATERIAL:"));
        assert!(!html.contains("class=\"price\""));
        assert!(!html.contains("class=\"description\""));

        let pages = project(&[product("A", "2500", "Seats three")], &options);
        let html = render_html(&pages, &options);
        assert!(html.contains("<div class=\"price\">Rs. 2500</div>"));
        assert!(html.contains("Seats three"));
    }

    #[test]
    fn text_is_escaped() {
        let options = ExportOptions::default();
        let pages = project(&[product("<b>Tom & Jerry</b>", "", "")], &options);
        let html = render_html(&pages, &options);
        assert!(html.contains("&lt;b&gt;Tom &amp; Jerry&lt;/b&gt;"));
        assert!(!html.contains("<b>Tom"));
    }

    #[test]
    fn logo_on_every_page() {
        let options = ExportOptions {
            logo: Some(Arc::new(ImageAsset::new("logo.png", "image/png", vec![9u8]))),
            ..Default::default()
        };
        let pages = project(&[product("A", "", ""), product("B", "", "")], &options);
        let html = render_html(&pages, &options);
        assert_eq!(html.matches("class=\"logo\"").count(), 2);
    }
}
