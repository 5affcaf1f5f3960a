//! Text display abstraction
//!
//! A display is a `ufmt` writer with a frame: `clear` starts a new frame,
//! text is written line by line and `update` shows it.

use ufmt::{uWrite, uwrite};

use crate::fsm::alarm_clock::Screen;

pub trait Display: uWrite {
    /// Start a new frame with the cursor in the top left corner
    fn clear(&mut self);

    /// Show the frame
    fn update(&mut self);
}

/// Draw a state screen: title on the first line, time on the second
pub fn render<D: Display + ?Sized>(display: &mut D, screen: &Screen) -> Result<(), D::Error> {
    display.clear();
    match screen {
        Screen::Edit { title, time } => uwrite!(display, "{}\n{}\n", *title, time.short())?,
        Screen::Live { title, time } => uwrite!(display, "{}\n{}\n", *title, time)?,
    }
    display.update();
    Ok(())
}
