mod executor;
mod html;
mod pdf;

pub use executor::CommandExecutor;
pub use html::{DocumentConverter, PandocConverter};
pub use pdf::{PdfRenderer, WkhtmltopdfRenderer, RENDER_SAFETY_ARGS};
