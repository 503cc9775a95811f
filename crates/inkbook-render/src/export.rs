//! Page export to PNG images and PDF documents.

use crate::codec::decode_data_url;
use crate::surface::{ImageFormat, RenderError, RenderResult, Surface};
use kurbo::Vec2;

/// A4 landscape page size in millimetres.
pub const PDF_PAGE_WIDTH_MM: f32 = 297.0;
pub const PDF_PAGE_HEIGHT_MM: f32 = 210.0;

/// Placement of the page image on the PDF page, measured from the top-left.
pub const PDF_IMAGE_X_MM: f32 = 10.0;
pub const PDF_IMAGE_Y_MM: f32 = 10.0;
pub const PDF_IMAGE_WIDTH_MM: f32 = 280.0;
pub const PDF_IMAGE_HEIGHT_MM: f32 = 160.0;

/// JPEG quality used for the embedded page image.
pub const PDF_JPEG_QUALITY: u8 = 100;

/// Resolution the surface is assumed to have when embedding.
const EXPORT_DPI: f32 = 96.0;

/// A file ready to hand to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Capture the surface with an identity transform, then put the pan back.
fn capture_unpanned<S: Surface>(surface: &mut S, format: ImageFormat) -> RenderResult<Vec<u8>> {
    let saved = surface.offset();
    surface.set_offset(Vec2::ZERO);
    let captured = surface.to_data_url(format);
    surface.set_offset(saved);
    let (_, bytes) = decode_data_url(&captured?)?;
    Ok(bytes)
}

/// Export the page as `<notebook>_Page<n>.png`.
pub fn export_image<S: Surface>(surface: &mut S, notebook: &str, page: usize) -> RenderResult<ExportArtifact> {
    let bytes = capture_unpanned(surface, ImageFormat::Png)?;
    log::info!("Exported {} page {} as PNG ({} bytes)", notebook, page, bytes.len());
    Ok(ExportArtifact {
        file_name: format!("{notebook}_Page{page}.png"),
        mime_type: "image/png",
        bytes,
    })
}

/// Export the page as `<notebook>_Page<n>.pdf`: one landscape A4 page with
/// the page image at 10 mm from the top-left corner, 280 x 160 mm.
pub fn export_document<S: Surface>(surface: &mut S, notebook: &str, page: usize) -> RenderResult<ExportArtifact> {
    let jpeg = capture_unpanned(
        surface,
        ImageFormat::Jpeg {
            quality: PDF_JPEG_QUALITY,
        },
    )?;
    let bytes = jpeg_to_pdf(&jpeg, &format!("{notebook} page {page}"))?;
    log::info!("Exported {} page {} as PDF ({} bytes)", notebook, page, bytes.len());
    Ok(ExportArtifact {
        file_name: format!("{notebook}_Page{page}.pdf"),
        mime_type: "application/pdf",
        bytes,
    })
}

/// Embed a JPEG into a single-page PDF.
fn jpeg_to_pdf(jpeg: &[u8], title: &str) -> RenderResult<Vec<u8>> {
    let (doc, page1, layer1) = printpdf::PdfDocument::new(
        title,
        printpdf::Mm(PDF_PAGE_WIDTH_MM),
        printpdf::Mm(PDF_PAGE_HEIGHT_MM),
        "Layer 1",
    );
    let current_layer = doc.get_page(page1).get_layer(layer1);

    let dynamic_image = printpdf::image_crate::load_from_memory(jpeg)
        .map_err(|e| RenderError::Export(format!("Failed to decode JPEG for PDF: {e}")))?;
    let (width_px, height_px) = (dynamic_image.width(), dynamic_image.height());
    if width_px == 0 || height_px == 0 {
        return Err(RenderError::Export("empty page image".to_string()));
    }
    let pdf_image = printpdf::Image::from_dynamic_image(&dynamic_image);

    // At EXPORT_DPI the image is px * 25.4 / dpi mm wide; scale to the target box.
    let natural_width_mm = width_px as f32 * 25.4 / EXPORT_DPI;
    let natural_height_mm = height_px as f32 * 25.4 / EXPORT_DPI;

    // PDF origin is bottom-left.
    let transform = printpdf::ImageTransform {
        translate_x: Some(printpdf::Mm(PDF_IMAGE_X_MM)),
        translate_y: Some(printpdf::Mm(PDF_PAGE_HEIGHT_MM - PDF_IMAGE_Y_MM - PDF_IMAGE_HEIGHT_MM)),
        scale_x: Some(PDF_IMAGE_WIDTH_MM / natural_width_mm),
        scale_y: Some(PDF_IMAGE_HEIGHT_MM / natural_height_mm),
        dpi: Some(EXPORT_DPI),
        ..Default::default()
    };
    pdf_image.add_to_layer(current_layer, transform);

    doc.save_to_bytes()
        .map_err(|e| RenderError::Export(format!("PDF save failed: {e}")))
}
