//! Startup check that the shader's storage block matches [`ForceSums`].
//!
//! A mismatch would silently misread every frame, so it is rejected before any
//! pipeline is built.

use crate::RenderError;
use airdrag_accum::{BindingPoint, ForceSums};
use naga::{AddressSpace, TypeInner};

/// Field names and byte offsets, in declaration order.
const EXPECTED_FIELDS: [(&str, u32); 2] = [("sum_force", 0), ("sum_torque", 16)];

/// Check the storage block declared at `binding` in WGSL `source`.
pub fn validate_force_block(source: &str, binding: BindingPoint) -> Result<(), RenderError> {
    let module = naga::front::wgsl::parse_str(source)
        .map_err(|e| RenderError::Shader(e.emit_to_string(source)))?;

    let var = module
        .global_variables
        .iter()
        .map(|(_, var)| var)
        .find(|var| {
            var.binding
                .as_ref()
                .is_some_and(|b| b.group == binding.group && b.binding == binding.binding)
        })
        .ok_or_else(|| RenderError::Layout(format!("no resource declared at {binding}")))?;

    if !matches!(var.space, AddressSpace::Storage { .. }) {
        return Err(RenderError::Layout(format!(
            "resource at {binding} is not a storage block"
        )));
    }

    let ty = &module.types[var.ty];
    let size = ty.inner.size(module.to_ctx());
    if u64::from(size) != ForceSums::SIZE {
        return Err(RenderError::Layout(format!(
            "block is {size} bytes, host expects {}",
            ForceSums::SIZE
        )));
    }

    let TypeInner::Struct { members, .. } = &ty.inner else {
        return Err(RenderError::Layout("block is not a struct".into()));
    };
    if members.len() != EXPECTED_FIELDS.len() {
        return Err(RenderError::Layout(format!(
            "block has {} fields, host expects {}",
            members.len(),
            EXPECTED_FIELDS.len()
        )));
    }
    for (member, (name, offset)) in members.iter().zip(EXPECTED_FIELDS) {
        let actual = member.name.as_deref().unwrap_or("<unnamed>");
        if actual != name || member.offset != offset {
            return Err(RenderError::Layout(format!(
                "field `{actual}` at offset {}, host expects `{name}` at {offset}",
                member.offset
            )));
        }
        let field_size = module.types[member.ty].inner.size(module.to_ctx());
        if field_size != 16 {
            return Err(RenderError::Layout(format!(
                "field `{actual}` is {field_size} bytes, host expects 16"
            )));
        }
    }

    tracing::debug!(%binding, size, "force block layout verified");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shaders::drag_shader;
    use airdrag_accum::FORCE_SUMS_BINDING;

    fn block(body: &str) -> String {
        format!(
            "struct ForceSums {{ {body} }};\n\
             @group(0) @binding(1) var<storage, read_write> sums: ForceSums;\n\
             @fragment fn fs_main() -> @location(0) vec4<f32> {{\n\
                 atomicAdd(&sums.sum_force[0], 1);\n\
                 return vec4<f32>(1.0);\n\
             }}\n"
        )
    }

    #[test]
    fn generated_shader_matches_host_layout() {
        let src = drag_shader(FORCE_SUMS_BINDING);
        validate_force_block(&src, FORCE_SUMS_BINDING).unwrap();
    }

    #[test]
    fn wrong_binding_is_reported() {
        let src = drag_shader(FORCE_SUMS_BINDING);
        let other = BindingPoint {
            group: 0,
            binding: 2,
        };
        let err = validate_force_block(&src, other).unwrap_err();
        assert!(matches!(err, RenderError::Layout(_)));
    }

    #[test]
    fn extra_counter_field_is_rejected() {
        let src = block(
            "sum_force: array<atomic<i32>, 4>, \
             sum_torque: array<atomic<i32>, 4>, \
             counter: array<atomic<u32>, 4>,",
        );
        let err = validate_force_block(&src, FORCE_SUMS_BINDING).unwrap_err();
        assert!(err.to_string().contains("48 bytes"));
    }

    #[test]
    fn swapped_fields_are_rejected() {
        let src = block("sum_torque: array<atomic<i32>, 4>, sum_force: array<atomic<i32>, 4>,");
        let err = validate_force_block(&src, FORCE_SUMS_BINDING).unwrap_err();
        assert!(err.to_string().contains("sum_torque"));
    }

    #[test]
    fn uniform_block_at_binding_is_rejected() {
        let src = drag_shader(FORCE_SUMS_BINDING);
        let uniforms = BindingPoint {
            group: 0,
            binding: crate::shaders::UNIFORM_BINDING,
        };
        let err = validate_force_block(&src, uniforms).unwrap_err();
        assert!(err.to_string().contains("not a storage block"));
    }
}
