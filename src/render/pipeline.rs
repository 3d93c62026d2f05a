use super::buffer::VertexArray;
use super::command::CommandList;
use super::device::ShaderId;

/// A shader paired with the vertex array it draws.
///
/// [`execute`](Self::execute) binds both, issues one indexed draw over the
/// vertex array's full index count and unbinds both again. A pipeline with a
/// missing half records nothing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Pipeline {
    label: String,
    shader: Option<ShaderId>,
    vertex_array: Option<VertexArray>,
}

impl Pipeline {
    pub fn new(label: impl Into<String>, shader: ShaderId, vertex_array: VertexArray) -> Self {
        Self {
            label: label.into(),
            shader: Some(shader),
            vertex_array: Some(vertex_array),
        }
    }

    pub fn empty(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    pub fn set_shader(&mut self, shader: Option<ShaderId>) {
        self.shader = shader;
    }

    pub fn set_vertex_array(&mut self, vertex_array: Option<VertexArray>) {
        self.vertex_array = vertex_array;
    }

    pub fn shader(&self) -> Option<ShaderId> {
        self.shader
    }

    pub fn vertex_array(&self) -> Option<&VertexArray> {
        self.vertex_array.as_ref()
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_ready(&self) -> bool {
        self.shader.is_some() && self.vertex_array.is_some()
    }

    /// Records the draw. Returns `false` when the pipeline is incomplete.
    pub fn execute(&self, commands: &mut CommandList) -> bool {
        let (Some(shader), Some(vertex_array)) = (self.shader, &self.vertex_array) else {
            log::warn!("pipeline '{}' has no shader or vertex array, skipping", self.label);
            return false;
        };

        commands.bind_shader(shader);
        commands.bind_vertex_array(vertex_array);
        commands.draw_indexed(vertex_array.index_count());
        commands.unbind_vertex_array();
        commands.unbind_shader();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{HeadlessDevice, RenderCommand};

    #[test]
    fn execute_records_bind_draw_unbind() {
        let mut device = HeadlessDevice::new();
        let quad = VertexArray::quad(&mut device).unwrap();
        let pipeline = Pipeline::new("quad", ShaderId(0), quad);

        let mut commands = CommandList::new();
        assert!(pipeline.execute(&mut commands));

        let recorded = commands.commands();
        assert_eq!(recorded.len(), 5);
        assert_eq!(recorded[0], RenderCommand::BindShader(ShaderId(0)));
        assert_eq!(recorded[2], RenderCommand::DrawIndexed { index_count: 6 });
        assert_eq!(recorded[4], RenderCommand::UnbindShader);
    }

    #[test]
    fn incomplete_pipeline_is_a_no_op() {
        let mut commands = CommandList::new();
        let mut pipeline = Pipeline::empty("nothing");
        assert!(!pipeline.execute(&mut commands));

        pipeline.set_shader(Some(ShaderId(1)));
        assert!(!pipeline.is_ready());
        assert!(!pipeline.execute(&mut commands));
        assert!(commands.is_empty());
    }
}
