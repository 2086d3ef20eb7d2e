//! Printable guest invitations.
//!
//! An invitation is a fixed-size SVG card: event branding, the guest, a QR
//! code of the guest id and the inviting exhibitor's booth. The same card is
//! embedded in an HTML page and placed on an A4 page for download.

pub mod layout;

pub use layout::{PageFit, A4_HEIGHT_MM, A4_WIDTH_MM};

use crate::config::EventConfig;
use crate::error::RepositoryError;
use crate::repository::{ExhibitorRepository, GuestRepository};
use crate::types::{Exhibitor, Guest, GuestId};
use axum::http::StatusCode;
use guestdesk_web::AppError;
use qrcode::types::QrError;
use qrcode::{Color, QrCode};
use std::fmt::Write as _;
use std::sync::Arc;
use thiserror::Error;

/// Card width in SVG user units.
pub const CARD_WIDTH: u32 = 420;

/// Card height in SVG user units.
pub const CARD_HEIGHT: u32 = 760;

const QR_SIZE: u32 = 160;
const QR_QUIET_ZONE: usize = 2;

/// Invitation failures.
#[derive(Debug, Error)]
pub enum InvitationError {
    /// Unknown or malformed guest id
    #[error("Invalid invitation")]
    NotFound,

    /// The guest id could not be encoded
    #[error("could not encode QR code: {0}")]
    Qr(#[from] QrError),

    /// Storage failure
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<InvitationError> for AppError {
    fn from(err: InvitationError) -> Self {
        match err {
            InvitationError::NotFound => {
                Self::new(StatusCode::NOT_FOUND, err.to_string(), "NOT_FOUND")
            },
            InvitationError::Qr(_) => Self::internal("Could not render invitation").with_source(err),
            InvitationError::Repository(source) => source.into(),
        }
    }
}

/// A guest together with the exhibitor that invited them.
#[derive(Debug, Clone)]
pub struct Invitation {
    /// The invited guest
    pub guest: Guest,
    /// The inviting exhibitor, if its profile exists
    pub exhibitor: Option<Exhibitor>,
}

/// A downloadable invitation.
#[derive(Debug, Clone)]
pub struct InvitationDocument {
    /// Suggested file name
    pub file_name: String,
    /// A4 SVG document
    pub svg: String,
}

/// Renders invitations with the configured event branding.
#[derive(Clone)]
pub struct InvitationRenderer {
    guests: Arc<dyn GuestRepository>,
    exhibitors: Arc<dyn ExhibitorRepository>,
    event: EventConfig,
}

impl InvitationRenderer {
    /// Creates a new `InvitationRenderer`.
    #[must_use]
    pub fn new(
        guests: Arc<dyn GuestRepository>,
        exhibitors: Arc<dyn ExhibitorRepository>,
        event: EventConfig,
    ) -> Self {
        Self {
            guests,
            exhibitors,
            event,
        }
    }

    /// Load the invitation for a token taken from a URL.
    ///
    /// # Errors
    ///
    /// [`InvitationError::NotFound`] for malformed or unknown ids.
    pub async fn load(&self, token: &str) -> Result<Invitation, InvitationError> {
        let id = GuestId::parse(token).ok_or(InvitationError::NotFound)?;
        let guest = self
            .guests
            .find(id)
            .await?
            .ok_or(InvitationError::NotFound)?;
        let exhibitor = self.exhibitors.find(guest.exhibitor_id).await?;
        Ok(Invitation { guest, exhibitor })
    }

    /// The card as a standalone SVG.
    ///
    /// # Errors
    ///
    /// [`InvitationError::Qr`] if the id cannot be encoded.
    pub fn card_svg(&self, invitation: &Invitation) -> Result<String, InvitationError> {
        let body = self.card_body(invitation)?;
        Ok(format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{CARD_WIDTH}" height="{CARD_HEIGHT}" viewBox="0 0 {CARD_WIDTH} {CARD_HEIGHT}">{body}</svg>"#
        ))
    }

    /// The card on an A4 page, scaled to fit.
    ///
    /// # Errors
    ///
    /// [`InvitationError::Qr`] if the id cannot be encoded.
    pub fn document(&self, invitation: &Invitation) -> Result<InvitationDocument, InvitationError> {
        let body = self.card_body(invitation)?;
        let fit = PageFit::a4(f64::from(CARD_WIDTH), f64::from(CARD_HEIGHT));
        let svg = format!(
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8"?>"#,
                r#"<svg xmlns="http://www.w3.org/2000/svg" width="{page_w}mm" height="{page_h}mm" viewBox="0 0 {page_w} {page_h}">"#,
                r#"<svg x="{x:.3}" y="{y:.3}" width="{w:.3}" height="{h:.3}" viewBox="0 0 {cw} {ch}">{body}</svg>"#,
                "</svg>"
            ),
            page_w = A4_WIDTH_MM,
            page_h = A4_HEIGHT_MM,
            x = fit.x,
            y = fit.y,
            w = fit.width,
            h = fit.height,
            cw = CARD_WIDTH,
            ch = CARD_HEIGHT,
            body = body,
        );

        Ok(InvitationDocument {
            file_name: document_file_name(&invitation.guest.guest_name),
            svg,
        })
    }

    /// HTML page embedding the card and a download link.
    ///
    /// # Errors
    ///
    /// [`InvitationError::Qr`] if the id cannot be encoded.
    pub fn page_html(&self, invitation: &Invitation) -> Result<String, InvitationError> {
        let card = self.card_svg(invitation)?;
        let title = escape(&self.event.title);
        let id = invitation.guest.id;
        Ok(format!(
            concat!(
                "<!DOCTYPE html>\n",
                r#"<html lang="en"><head><meta charset="utf-8">"#,
                r#"<meta name="viewport" content="width=device-width, initial-scale=1">"#,
                "<title>{title}</title>",
                "<style>body{{margin:0;background:#1f2430;display:flex;flex-direction:column;align-items:center;padding:24px;font-family:sans-serif}}",
                "a.download{{color:#fff;margin-bottom:16px}}svg{{max-width:100%;height:auto;background:#fff}}</style>",
                "</head><body>",
                r#"<a class="download" href="/invite/{id}/document">Download</a>"#,
                "{card}",
                "</body></html>"
            ),
            title = title,
            id = id,
            card = card,
        ))
    }

    fn card_body(&self, invitation: &Invitation) -> Result<String, InvitationError> {
        let guest = &invitation.guest;
        let (exhibitor_name, booth) = invitation.exhibitor.as_ref().map_or(
            ("Exhibitor", "-"),
            |e| {
                (
                    non_empty_or(&e.company_name, "Exhibitor"),
                    non_empty_or(&e.booth_number, "-"),
                )
            },
        );
        let qr = qr_path(&guest.id.to_string())?;
        let qr_x = (CARD_WIDTH - QR_SIZE) / 2;

        let mut svg = String::new();
        let _ = write!(
            svg,
            concat!(
                r##"<rect width="{w}" height="{h}" fill="#ffffff"/>"##,
                r##"<rect width="{w}" height="110" fill="#1f2430"/>"##,
                r##"<text x="{cx}" y="52" text-anchor="middle" font-family="sans-serif" font-size="22" font-weight="bold" fill="#ffffff">{title}</text>"##,
                r##"<text x="{cx}" y="84" text-anchor="middle" font-family="sans-serif" font-size="12" letter-spacing="2" fill="#c9a45c">{subtitle}</text>"##,
                r##"<text x="{cx}" y="150" text-anchor="middle" font-family="serif" font-size="13" fill="#444444">We are delighted to invite you</text>"##,
                r##"<text x="{cx}" y="170" text-anchor="middle" font-family="serif" font-size="13" fill="#444444">to visit our booth.</text>"##,
                r##"<text x="{cx}" y="240" text-anchor="middle" font-family="sans-serif" font-size="14" fill="#666666">{company}</text>"##,
                r##"<text x="{cx}" y="280" text-anchor="middle" font-family="sans-serif" font-size="26" font-weight="bold" fill="#111111">{name}</text>"##,
                r##"<rect x="{fx}" y="{fy}" width="{fs}" height="{fs}" fill="none" stroke="#1f2430" stroke-width="2"/>"##,
                r##"<svg x="{qx}" y="330" width="{qs}" height="{qs}" viewBox="0 0 {qn} {qn}" shape-rendering="crispEdges"><rect width="{qn}" height="{qn}" fill="#ffffff"/><path d="{qd}" fill="#000000"/></svg>"##,
                r##"<text x="{cx}" y="520" text-anchor="middle" font-family="sans-serif" font-size="11" letter-spacing="3" fill="#666666">SCAN AT RECEPTION</text>"##,
                r##"<text x="{cx}" y="575" text-anchor="middle" font-family="sans-serif" font-size="11" fill="#999999">Invited by</text>"##,
                r##"<text x="{cx}" y="605" text-anchor="middle" font-family="sans-serif" font-size="18" font-weight="bold" fill="#111111">{exhibitor}</text>"##,
                r##"<text x="{cx}" y="635" text-anchor="middle" font-family="sans-serif" font-size="14" fill="#c9a45c">BOOTH: {booth}</text>"##,
                r##"<rect y="700" width="{w}" height="60" fill="#1f2430"/>"##,
                r##"<text x="{cx}" y="735" text-anchor="middle" font-family="sans-serif" font-size="12" fill="#ffffff">{venue}</text>"##,
            ),
            w = CARD_WIDTH,
            h = CARD_HEIGHT,
            cx = CARD_WIDTH / 2,
            title = escape(&self.event.title),
            subtitle = escape(&self.event.subtitle),
            company = escape(&guest.company_name),
            name = escape(&guest.guest_name),
            fx = qr_x - 8,
            fy = 322,
            fs = QR_SIZE + 16,
            qx = qr_x,
            qs = QR_SIZE,
            qn = qr.size,
            qd = qr.path,
            exhibitor = escape(exhibitor_name),
            booth = escape(booth),
            venue = escape(&self.event.venue),
        );
        Ok(svg)
    }
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

struct QrPath {
    /// Side length in modules, quiet zone included
    size: usize,
    /// SVG path data, one unit square per dark module
    path: String,
}

fn qr_path(data: &str) -> Result<QrPath, QrError> {
    let code = QrCode::new(data.as_bytes())?;
    let width = code.width();
    let mut path = String::new();

    for (index, color) in code.to_colors().into_iter().enumerate() {
        if color == Color::Dark {
            let x = index % width + QR_QUIET_ZONE;
            let y = index / width + QR_QUIET_ZONE;
            let _ = write!(path, "M{x} {y}h1v1h-1z");
        }
    }

    Ok(QrPath {
        size: width + 2 * QR_QUIET_ZONE,
        path,
    })
}

/// Escape text for XML and HTML content and attributes.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Download name for a guest's invitation.
#[must_use]
pub fn document_file_name(guest_name: &str) -> String {
    let name: String = guest_name
        .chars()
        .map(|c| match c {
            '"' | '\\' | '/' | '\r' | '\n' => '_',
            other => other,
        })
        .collect();
    format!("Invitation_{name}.svg")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::repository::InMemoryRepository;
    use crate::types::{ExhibitorId, GuestDetails, NewGuest};

    fn event() -> EventConfig {
        EventConfig {
            title: "Trade <Fair>".to_string(),
            subtitle: "Official invitation".to_string(),
            venue: "Hall B".to_string(),
        }
    }

    async fn setup() -> (InvitationRenderer, Invitation) {
        let repo = Arc::new(InMemoryRepository::new());
        let exhibitor = Exhibitor {
            id: ExhibitorId::new(),
            company_name: "Acme".to_string(),
            booth_number: "B-12".to_string(),
            email: "booth@example.com".to_string(),
        };
        repo.seed_exhibitor(exhibitor.clone()).unwrap();
        let guest = repo
            .insert(NewGuest::invited(
                exhibitor.id,
                GuestDetails {
                    guest_name: "Ada & Co".to_string(),
                    company_name: "Analytical Engines".to_string(),
                    ..GuestDetails::default()
                },
            ))
            .await
            .unwrap();

        let renderer = InvitationRenderer::new(repo.clone(), repo, event());
        let invitation = renderer.load(&guest.id.to_string()).await.unwrap();
        (renderer, invitation)
    }

    #[tokio::test]
    async fn test_card_shows_guest_and_booth() {
        let (renderer, invitation) = setup().await;
        let svg = renderer.card_svg(&invitation).unwrap();

        assert!(svg.contains("Ada &amp; Co"));
        assert!(svg.contains("Analytical Engines"));
        assert!(svg.contains("Acme"));
        assert!(svg.contains("BOOTH: B-12"));
        assert!(svg.contains("Trade &lt;Fair&gt;"));
        assert!(svg.contains("Hall B"));
    }

    #[tokio::test]
    async fn test_missing_exhibitor_uses_fallbacks() {
        let (renderer, mut invitation) = setup().await;
        invitation.exhibitor = None;
        let svg = renderer.card_svg(&invitation).unwrap();

        assert!(svg.contains(">Exhibitor<"));
        assert!(svg.contains("BOOTH: -"));
    }

    #[tokio::test]
    async fn test_document_is_a4_and_named_after_guest() {
        let (renderer, invitation) = setup().await;
        let document = renderer.document(&invitation).unwrap();

        assert_eq!(document.file_name, "Invitation_Ada & Co.svg");
        assert!(document.svg.contains(r#"width="210mm" height="297mm""#));
        // 760/420 * 210 = 380mm, taller than the page, so scaled to height.
        assert!(document.svg.contains(r#"height="297.000""#));
    }

    #[tokio::test]
    async fn test_page_links_to_document() {
        let (renderer, invitation) = setup().await;
        let html = renderer.page_html(&invitation).unwrap();
        assert!(html.contains(&format!("/invite/{}/document", invitation.guest.id)));
        assert!(html.contains("<svg"));
    }

    #[tokio::test]
    async fn test_unknown_or_malformed_id_not_found() {
        let (renderer, _) = setup().await;
        assert!(matches!(
            renderer.load("does-not-exist").await,
            Err(InvitationError::NotFound)
        ));
        assert!(matches!(
            renderer.load(&GuestId::new().to_string()).await,
            Err(InvitationError::NotFound)
        ));
    }

    #[test]
    fn test_qr_has_dark_modules_inside_quiet_zone() {
        let qr = qr_path("0b6f5c55-3c1e-4a57-9d1f-2f7f3c0e9a11").unwrap();
        assert!(qr.size > 2 * QR_QUIET_ZONE);
        assert!(qr.path.starts_with(&format!("M{QR_QUIET_ZONE} {QR_QUIET_ZONE}")));
    }
}
