use super::command::CommandList;
use super::device::{PassTarget, RenderDevice, RenderResult};
use super::framebuffer::FrameBuffer;
use super::pipeline::Pipeline;
use crate::color::Color;
use crate::error::RenderError;

/// A group of pipelines drawing into one framebuffer.
///
/// [`begin`](Self::begin) binds the framebuffer and queues a clear,
/// [`execute`](Self::execute) records every pipeline in insertion order and
/// [`end`](Self::end) submits the recording and unbinds the framebuffer.
#[derive(Debug)]
pub struct RenderPass {
    label: String,
    pipelines: Vec<Pipeline>,
    framebuffer: FrameBuffer,
    clear_color: Color,
    commands: CommandList,
    active: bool,
}

impl RenderPass {
    pub fn new(label: impl Into<String>, framebuffer: FrameBuffer) -> Self {
        Self {
            label: label.into(),
            pipelines: Vec::new(),
            framebuffer,
            clear_color: Color::BLACK,
            commands: CommandList::new(),
            active: false,
        }
    }

    pub fn with_clear_color(mut self, color: Color) -> Self {
        self.clear_color = color;
        self
    }

    /// Appends a pipeline and returns its index.
    pub fn add_pipeline(&mut self, pipeline: Pipeline) -> usize {
        self.pipelines.push(pipeline);
        self.pipelines.len() - 1
    }

    pub fn pipelines(&self) -> &[Pipeline] {
        &self.pipelines
    }

    pub fn pipeline_mut(&mut self, index: usize) -> Option<&mut Pipeline> {
        self.pipelines.get_mut(index)
    }

    pub fn begin(&mut self) -> RenderResult<()> {
        if self.active {
            return Err(RenderError::PassAlreadyBegun);
        }
        if !self.framebuffer.is_complete() {
            log::error!("pass '{}' refused: framebuffer incomplete", self.label);
            return Err(RenderError::IncompleteFramebuffer(format!(
                "pass '{}' has no complete target",
                self.label
            )));
        }

        self.framebuffer.bind();
        self.framebuffer.clear(self.clear_color)?;
        self.commands.clear();
        self.active = true;
        Ok(())
    }

    /// Records every pipeline. Returns how many recorded a draw.
    pub fn execute(&mut self) -> RenderResult<usize> {
        let (pipelines, commands) = self.recording()?;
        Ok(pipelines.iter().filter(|p| p.execute(commands)).count())
    }

    /// The pipelines and the open command list, for callers recording their
    /// own per-draw state around a pipeline.
    pub fn recording(&mut self) -> RenderResult<(&[Pipeline], &mut CommandList)> {
        if !self.active {
            return Err(RenderError::PassNotBegun);
        }
        Ok((&self.pipelines, &mut self.commands))
    }

    /// Submits the recorded commands and unbinds the framebuffer.
    pub fn end(&mut self, device: &mut dyn RenderDevice) -> RenderResult<()> {
        if !self.active {
            return Err(RenderError::PassNotBegun);
        }
        self.active = false;

        let clear = self.framebuffer.take_clear();
        let result = match self.framebuffer.target() {
            Some(target) => device.submit(PassTarget::Offscreen(target), clear, &self.commands),
            None => Err(RenderError::IncompleteFramebuffer("target released".into())),
        };
        self.framebuffer.unbind();

        if let Err(err) = &result {
            log::error!("pass '{}' failed to submit: {err}", self.label);
        }
        result
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn framebuffer(&self) -> &FrameBuffer {
        &self.framebuffer
    }

    pub fn framebuffer_mut(&mut self) -> &mut FrameBuffer {
        &mut self.framebuffer
    }

    pub fn commands(&self) -> &CommandList {
        &self.commands
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{HeadlessDevice, Shader, ShaderId, ShaderSource, Texture, VertexArray};

    fn pass_with_pipelines(device: &mut HeadlessDevice) -> (RenderPass, ShaderId, ShaderId) {
        let framebuffer = FrameBuffer::new(device, 64, 64).unwrap();
        let quad = VertexArray::quad(device).unwrap();
        let a = Shader::new(device, &ShaderSource::sprite()).unwrap().id();
        let b = Shader::new(device, &ShaderSource::sprite()).unwrap().id();

        let mut pass = RenderPass::new("test", framebuffer);
        pass.add_pipeline(Pipeline::new("a", a, quad.clone()));
        pass.add_pipeline(Pipeline::empty("broken"));
        pass.add_pipeline(Pipeline::new("b", b, quad));
        (pass, a, b)
    }

    #[test]
    fn executes_pipelines_in_order() {
        let mut device = HeadlessDevice::new();
        let (mut pass, a, b) = pass_with_pipelines(&mut device);
        let white = Texture::solid(&mut device, Color::WHITE).unwrap();

        pass.begin().unwrap();
        assert!(pass.framebuffer().is_bound());
        pass.recording().unwrap().1.bind_texture(0, white.id());
        assert_eq!(pass.execute().unwrap(), 2);
        pass.end(&mut device).unwrap();
        assert!(!pass.framebuffer().is_bound());

        let submitted = device.submissions();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].clear, Some(Color::BLACK));
        let shaders: Vec<_> = submitted[0].draws.iter().map(|d| d.shader).collect();
        assert_eq!(shaders, vec![a, b]);
    }

    #[test]
    fn begin_and_end_must_pair() {
        let mut device = HeadlessDevice::new();
        let (mut pass, _, _) = pass_with_pipelines(&mut device);

        assert_eq!(pass.execute(), Err(RenderError::PassNotBegun));
        assert_eq!(pass.end(&mut device), Err(RenderError::PassNotBegun));
        pass.begin().unwrap();
        assert_eq!(pass.begin(), Err(RenderError::PassAlreadyBegun));
        pass.end(&mut device).unwrap();
    }

    #[test]
    fn incomplete_framebuffer_blocks_begin() {
        let mut pass = RenderPass::new("empty", FrameBuffer::uninitialized());
        assert!(matches!(pass.begin(), Err(RenderError::IncompleteFramebuffer(_))));
        assert!(!pass.is_active());
    }
}
