/// Pure rendering of the current entry
///
/// `render` is called after every engine state change and builds the
/// whole widget tree from the current view; nothing here holds state.
use iced::widget::image::Handle;
use iced::widget::{button, column, container, row, scrollable, text, text_input, Column, Image};
use iced::{Alignment, Element, Length};
use std::path::Path;

use crate::state::CurrentView;
use crate::Message;

/// Id of the caption text box, refocused after every navigation
pub fn caption_input_id() -> text_input::Id {
    text_input::Id::new("caption")
}

/// Per-frame inputs owned by the application shell
#[derive(Debug, Clone, Copy)]
pub struct RenderInputs<'a> {
    /// Caption being typed
    pub caption: &'a str,
    /// Status line
    pub status: &'a str,
    /// Preview size in pixels, `None` if the image header is unreadable
    pub preview: Option<(u32, u32)>,
    /// Weight of the current entry
    pub weight: i64,
    /// Side of the square the preview was fitted into
    pub preview_box: u32,
}

/// Scale `(width, height)` so the longer side equals `max`, keeping aspect ratio
pub fn fit_within(width: u32, height: u32, max: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (0, 0);
    }

    let scale = |side: u32, long: u32| ((side as u64 * max as u64) / long as u64).max(1) as u32;
    if width > height {
        (max, scale(height, width))
    } else {
        (scale(width, height), max)
    }
}

/// Read the image header and compute its on-screen size
pub fn preview_size(path: &Path, max: u32) -> Option<(u32, u32)> {
    match image::image_dimensions(path) {
        Ok((width, height)) => Some(fit_within(width, height, max)),
        Err(e) => {
            tracing::warn!("⚠️  Cannot read image {}: {}", path.display(), e);
            None
        }
    }
}

/// Build the curation screen for the current entry
pub fn render<'a>(view: &'a CurrentView, inputs: RenderInputs<'a>) -> Element<'a, Message> {
    let side = inputs.preview_box as f32;
    let preview: Element<'a, Message> = match inputs.preview {
        Some((width, height)) => Image::new(Handle::from_path(&view.image_path))
            .width(Length::Fixed(width as f32))
            .height(Length::Fixed(height as f32))
            .into(),
        None => text("Cannot display this image").size(16).into(),
    };
    let left = container(preview)
        .width(Length::Fixed(side))
        .height(Length::Fixed(side))
        .center_x(Length::Fixed(side))
        .center_y(Length::Fixed(side));

    // Paths are read-only inputs so they can be selected and copied
    let image_path = view.image_path.display().to_string();
    let log_path = view.log_path.display().to_string();

    let captions = Column::with_children(
        view.captions()
            .map(|caption| text(caption).size(14).into()),
    )
    .spacing(4);

    let caption_box = text_input("Describe this image and press Enter", inputs.caption)
        .id(caption_input_id())
        .on_input(Message::CaptionChanged)
        .on_submit(Message::Submit)
        .padding(8)
        .width(Length::Fill);

    let buttons = row![
        button("Previous").on_press(Message::Previous).padding(10),
        button("Next").on_press(Message::Next).padding(10),
        button("Exclude").on_press(Message::Exclude).padding(10),
    ]
    .spacing(10);

    let right = column![
        text(format!(
            "Image {} of {} (weight {})",
            view.index + 1,
            view.total,
            inputs.weight
        ))
        .size(20),
        text_input("", &image_path).size(12),
        text_input("", &log_path).size(12),
        scrollable(captions).height(Length::Fill),
        caption_box,
        buttons,
        text(inputs.status).size(14),
    ]
    .spacing(10)
    .padding(10)
    .width(Length::Fill);

    row![left, right]
        .spacing(10)
        .padding(10)
        .align_y(Alignment::Start)
        .into()
}
