use airdrag_accum::{BindingPoint, FORCE_SCALE};

/// Binding index of the uniform block, in the same group as the force sums.
pub const UNIFORM_BINDING: u32 = 0;

/// WGSL for the airfoil pass. The fragment stage adds each sample's force and
/// torque into the storage block with atomics. Placeholders are filled by
/// [`drag_shader`].
const DRAG_SHADER_TEMPLATE: &str = r#"
struct Uniforms {
    model: mat4x4<f32>,
    view: mat4x4<f32>,
    proj: mat4x4<f32>,
    center: vec4<f32>,
    flow: vec4<f32>,
};

struct ForceSums {
    sum_force: array<atomic<i32>, 4>,
    sum_torque: array<atomic<i32>, 4>,
};

@group({{GROUP}}) @binding({{UNIFORM_BINDING}})
var<uniform> uniforms: Uniforms;

{{FORCE_SUMS_BINDING}}
var<storage, read_write> sums: ForceSums;

const FORCE_SCALE: f32 = {{FORCE_SCALE}};

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
};

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    // The model transform is rigid, so it also carries normals.
    let world = uniforms.model * vec4<f32>(vertex.position, 1.0);

    var out: VertexOutput;
    out.clip_position = uniforms.proj * uniforms.view * world;
    out.world_position = world.xyz;
    out.world_normal = (uniforms.model * vec4<f32>(vertex.normal, 0.0)).xyz;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let n = normalize(in.world_normal);
    let pressure = max(-dot(n, uniforms.flow.xyz), 0.0);
    let force = -n * pressure;
    let torque = cross(in.world_position - uniforms.center.xyz, force);

    let f = vec3<i32>(round(force * FORCE_SCALE));
    let t = vec3<i32>(round(torque * FORCE_SCALE));
    atomicAdd(&sums.sum_force[0], f.x);
    atomicAdd(&sums.sum_force[1], f.y);
    atomicAdd(&sums.sum_force[2], f.z);
    atomicAdd(&sums.sum_force[3], 1);
    atomicAdd(&sums.sum_torque[0], t.x);
    atomicAdd(&sums.sum_torque[1], t.y);
    atomicAdd(&sums.sum_torque[2], t.z);

    let shade = 0.35 + 0.65 * pressure;
    return vec4<f32>(vec3<f32>(0.85, 0.85, 0.9) * shade, 1.0);
}
"#;

/// Instantiate the airfoil shader with the force sums at `binding`.
pub fn drag_shader(binding: BindingPoint) -> String {
    DRAG_SHADER_TEMPLATE
        .replace("{{GROUP}}", &binding.group.to_string())
        .replace("{{UNIFORM_BINDING}}", &UNIFORM_BINDING.to_string())
        .replace("{{FORCE_SUMS_BINDING}}", &binding.to_string())
        .replace("{{FORCE_SCALE}}", &format!("{FORCE_SCALE:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use airdrag_accum::FORCE_SUMS_BINDING;

    #[test]
    fn placeholders_are_filled() {
        let src = drag_shader(FORCE_SUMS_BINDING);
        assert!(!src.contains("{{"));
        assert!(src.contains("@group(0) @binding(1)\nvar<storage, read_write> sums"));
        assert!(src.contains("const FORCE_SCALE: f32 = 1000.0;"));
    }

    #[test]
    fn generated_source_parses() {
        let src = drag_shader(FORCE_SUMS_BINDING);
        let module = naga::front::wgsl::parse_str(&src).unwrap();
        assert!(module.entry_points.iter().any(|ep| ep.name == "fs_main"));
        assert!(module.entry_points.iter().any(|ep| ep.name == "vs_main"));
    }
}
