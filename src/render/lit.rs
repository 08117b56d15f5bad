use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use super::gpu::{depth_state, uniform_layout_entry, DrawPass, GpuContext};
use crate::geometry::FlatMesh;
use crate::lighting::LightingUniforms;
use crate::transform::FrameMatrices;

/// Per-frame uniforms of the lit pipeline. `params.x` carries shininess.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LitUniform {
    pub model: [f32; 16],
    pub view: [f32; 16],
    pub projection: [f32; 16],
    pub light_position: [f32; 4],
    pub ambient_product: [f32; 4],
    pub diffuse_product: [f32; 4],
    pub specular_product: [f32; 4],
    pub params: [f32; 4],
}

impl LitUniform {
    pub fn new(matrices: &FrameMatrices, lighting: &LightingUniforms) -> Self {
        Self {
            model: matrices.model_cols(),
            view: matrices.view_cols(),
            projection: matrices.projection_cols(),
            light_position: lighting.light_position.to_array(),
            ambient_product: lighting.ambient_product.to_array(),
            diffuse_product: lighting.diffuse_product.to_array(),
            specular_product: lighting.specular_product.to_array(),
            params: [lighting.shininess, 0.0, 0.0, 0.0],
        }
    }
}

/// Draws a [`FlatMesh`] with per-vertex Blinn-Phong lighting.
pub struct LitMeshRenderer {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    vertices: wgpu::Buffer,
    vertex_count: u32,
}

impl LitMeshRenderer {
    pub fn new(gpu: &GpuContext, mesh: &FlatMesh) -> Self {
        let device = gpu.device();
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("lit-shader"),
            source: wgpu::ShaderSource::Wgsl(LIT_SHADER.into()),
        });
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("lit-bind-layout"),
            entries: &[uniform_layout_entry(
                0,
                wgpu::ShaderStages::VERTEX,
                std::mem::size_of::<LitUniform>(),
            )],
        });
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("lit-uniform"),
            size: std::mem::size_of::<LitUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("lit-bind-group"),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("lit-pipeline-layout"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("lit-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: (6 * std::mem::size_of::<f32>()) as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3],
                }],
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(depth_state()),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.format(),
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            multiview: None,
        });

        let data = mesh.interleaved();
        let vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("lit-vertices"),
            contents: bytemuck::cast_slice(&data),
            usage: wgpu::BufferUsages::VERTEX,
        });

        Self {
            pipeline,
            uniform_buffer,
            bind_group,
            vertices,
            vertex_count: mesh.vertex_count() as u32,
        }
    }

    /// Uploads this frame's matrices and lighting products.
    pub fn update(&self, queue: &wgpu::Queue, matrices: &FrameMatrices, lighting: &LightingUniforms) {
        let uniform = LitUniform::new(matrices, lighting);
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniform));
    }
}

impl DrawPass for LitMeshRenderer {
    fn draw<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>) {
        if self.vertex_count == 0 {
            return;
        }
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertices.slice(..));
        pass.draw(0..self.vertex_count, 0..1);
    }
}

// Mirrors `LightingUniforms::shade_vertex`.
const LIT_SHADER: &str = r#"
struct Uniforms {
    model: mat4x4<f32>,
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
    light_position: vec4<f32>,
    ambient_product: vec4<f32>,
    diffuse_product: vec4<f32>,
    specular_product: vec4<f32>,
    params: vec4<f32>,
}

@group(0) @binding(0)
var<uniform> u: Uniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) color: vec4<f32>,
}

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    let model_view = u.view * u.model;
    let eye_position = (model_view * vec4<f32>(input.position, 1.0)).xyz;
    let normal = normalize((model_view * vec4<f32>(input.normal, 0.0)).xyz);

    var to_light = normalize(u.light_position.xyz - eye_position);
    if (u.light_position.w == 0.0) {
        to_light = normalize(u.light_position.xyz);
    }
    let to_eye = normalize(-eye_position);
    let halfway = normalize(to_light + to_eye);

    let facing = dot(to_light, normal);
    let diffuse = u.diffuse_product * max(facing, 0.0);
    var specular = u.specular_product * pow(max(dot(normal, halfway), 0.0), u.params.x);
    if (facing < 0.0) {
        specular = vec4<f32>(0.0, 0.0, 0.0, 1.0);
    }

    var out: VertexOutput;
    out.position = u.projection * model_view * vec4<f32>(input.position, 1.0);
    out.color = vec4<f32>((u.ambient_product + diffuse + specular).xyz, 1.0);
    return out;
}

@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    return input.color;
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lighting::PointLight;
    use crate::material::Material;
    use crate::session::{DemoKind, Session};
    use crate::transform::TransformComposer;

    #[test]
    fn uniform_matches_shader_layout() {
        assert_eq!(std::mem::size_of::<LitUniform>(), 3 * 64 + 5 * 16);
    }

    #[test]
    fn uniform_carries_products_and_shininess() {
        let session = Session::new(DemoKind::Lit);
        let composer = TransformComposer::new(session.projection, 1.0);
        let matrices = composer.compose(&session.transforms);
        let lighting = LightingUniforms::new(&PointLight::default(), &Material::default());
        let uniform = LitUniform::new(&matrices, &lighting);
        assert_eq!(uniform.model, matrices.model.to_cols_array());
        assert_eq!(uniform.diffuse_product, [0.1, 0.25, 1.0, 1.0]);
        assert_eq!(uniform.params[0], 100.0);
    }
}
