//! `<img>` rendering with Maud.
//!
//! [`ImageAttributes`] is the attribute set the host's image-rendering
//! handlers pass around; the media library fills in `srcset` and `sizes`
//! before [`render_img`] turns it into markup.

use maud::{Markup, html};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageAttributes {
    pub src: String,
    pub width: u32,
    pub height: u32,
    pub alt: String,
    pub class: Option<String>,
    pub srcset: Option<String>,
    pub sizes: Option<String>,
}

impl ImageAttributes {
    pub fn new(src: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            src: src.into(),
            width,
            height,
            ..Self::default()
        }
    }
}

/// Default `sizes` for an image displayed at `width` CSS pixels.
pub fn sizes_attribute(width: u32) -> String {
    format!("(max-width: {width}px) 100vw, {width}px")
}

pub fn render_img(attrs: &ImageAttributes) -> Markup {
    html! {
        img src=(attrs.src)
            width=(attrs.width)
            height=(attrs.height)
            alt=(attrs.alt)
            class=[attrs.class.as_deref()]
            srcset=[attrs.srcset.as_deref()]
            sizes=[attrs.sizes.as_deref()]
            loading="lazy";
    }
}
