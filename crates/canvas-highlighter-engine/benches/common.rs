// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
use canvas_highlighter_engine::{Display, Document, DocumentBuilder};

/// `paragraphs` paragraphs, each mixing plain text with inline elements and
/// whitespace-only leaves between them.
#[allow(dead_code)]
pub fn generate_document(paragraphs: usize) -> Document {
    let mut builder = DocumentBuilder::new(600.0);
    builder.element("article", Display::Block, |article| {
        for index in 0..paragraphs {
            article.element("p", Display::Block, |p| {
                p.text(&format!("Paragraph {index} opens with some plain text, "));
                p.element("em", Display::Inline, |em| {
                    em.text("then an emphasised phrase");
                });
                p.text(" ");
                p.element("a", Display::Inline, |a| {
                    a.text("and a link");
                });
                p.text(" before it wraps onto the next line of the container.");
            });
        }
    });
    builder.build()
}
