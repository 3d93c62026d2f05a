//! Off-screen color + depth/stencil target.
//!
//! A [`FrameBuffer`] wraps one device render target and tracks where it is in
//! its lifecycle:
//!
//! ```text
//! Uninitialized --bind--> Bound --resize + check_status--> Attached
//!                                  ^                          |
//!                                  +---------resize-----------+
//! ```
//!
//! The color attachment is an ordinary [`TextureId`], so an editor viewport can
//! sample it or [`RenderDevice::present`] can copy it to the window.

use super::device::{RenderDevice, RenderResult, RenderTargetId, TargetStatus, TextureId};
use crate::color::Color;
use crate::error::RenderError;

pub const DEFAULT_WIDTH: u32 = 1600;
pub const DEFAULT_HEIGHT: u32 = 900;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameBufferState {
    /// No attachments and not bound.
    Uninitialized,
    /// Bound for drawing, attachments missing or incomplete.
    Bound,
    /// Complete attachments.
    Attached,
}

#[derive(Debug)]
pub struct FrameBuffer {
    target: Option<RenderTargetId>,
    color: Option<TextureId>,
    width: u32,
    height: u32,
    complete: bool,
    bound: bool,
    pending_clear: Option<Color>,
}

impl FrameBuffer {
    /// A framebuffer with no attachments yet.
    pub fn uninitialized() -> Self {
        Self {
            target: None,
            color: None,
            width: 0,
            height: 0,
            complete: false,
            bound: false,
            pending_clear: None,
        }
    }

    /// Creates and attaches a complete `width` x `height` target.
    pub fn new(device: &mut dyn RenderDevice, width: u32, height: u32) -> RenderResult<Self> {
        let mut framebuffer = Self::uninitialized();
        framebuffer.bind();
        let attached = framebuffer.resize(device, width, height);
        framebuffer.unbind();
        attached?;
        if !framebuffer.complete {
            return Err(RenderError::IncompleteFramebuffer(format!(
                "cannot attach {width}x{height}"
            )));
        }
        Ok(framebuffer)
    }

    /// Redirects the next pass to this target.
    pub fn bind(&mut self) {
        self.bound = true;
    }

    pub fn unbind(&mut self) {
        self.bound = false;
        self.pending_clear = None;
    }

    /// Recreates the attachments at a new size.
    ///
    /// Does nothing when the size is unchanged and the target is complete,
    /// or when either dimension is zero (a minimized viewport).
    pub fn resize(&mut self, device: &mut dyn RenderDevice, width: u32, height: u32) -> RenderResult<()> {
        if width == 0 || height == 0 {
            log::debug!("ignoring framebuffer resize to {width}x{height}");
            return Ok(());
        }
        if self.complete && (self.width, self.height) == (width, height) {
            return Ok(());
        }

        if let Some(old) = self.target.take() {
            device.destroy_render_target(old);
        }
        self.color = None;
        self.complete = false;
        self.width = width;
        self.height = height;

        let target = device.create_render_target(width, height).inspect_err(|err| {
            log::error!("framebuffer attachment failed: {err}");
        })?;
        self.target = Some(target);
        self.color = device.render_target_color(target);
        log::debug!("framebuffer resized to {width}x{height}");

        self.check_status(device)
    }

    /// Confirms the attachments are complete. Rendering into an incomplete
    /// framebuffer is refused until a later resize succeeds.
    pub fn check_status(&mut self, device: &dyn RenderDevice) -> RenderResult<()> {
        let status = match self.target {
            Some(target) => device.render_target_status(target),
            None => TargetStatus::Incomplete("no attachments".into()),
        };

        match status {
            TargetStatus::Complete if self.color.is_some() => {
                self.complete = true;
                Ok(())
            }
            TargetStatus::Complete => {
                self.complete = false;
                log::error!("framebuffer is incomplete: missing color attachment");
                Err(RenderError::IncompleteFramebuffer("missing color attachment".into()))
            }
            TargetStatus::Incomplete(reason) => {
                self.complete = false;
                log::error!("framebuffer is incomplete: {reason}");
                Err(RenderError::IncompleteFramebuffer(reason))
            }
        }
    }

    /// Requests a clear at the start of the bound pass.
    pub fn clear(&mut self, color: Color) -> RenderResult<()> {
        if !self.bound {
            return Err(RenderError::FramebufferNotBound);
        }
        self.pending_clear = Some(color);
        Ok(())
    }

    pub(crate) fn take_clear(&mut self) -> Option<Color> {
        self.pending_clear.take()
    }

    pub fn state(&self) -> FrameBufferState {
        if self.complete {
            FrameBufferState::Attached
        } else if self.bound {
            FrameBufferState::Bound
        } else {
            FrameBufferState::Uninitialized
        }
    }

    pub fn is_bound(&self) -> bool {
        self.bound
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn target(&self) -> Option<RenderTargetId> {
        self.target
    }

    /// The color output, valid while the framebuffer is attached.
    pub fn color_attachment(&self) -> Option<TextureId> {
        self.color.filter(|_| self.complete)
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Releases the device target.
    pub fn release(&mut self, device: &mut dyn RenderDevice) {
        if let Some(target) = self.target.take() {
            device.destroy_render_target(target);
        }
        self.color = None;
        self.complete = false;
    }
}
