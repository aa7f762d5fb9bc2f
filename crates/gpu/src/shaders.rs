/// WGSL module holding the four automaton compute entry points.
///
/// Each workgroup covers one 32x32 tile; each of its 16x16 invocations owns a
/// 2x2 block of cells. The field wraps toroidally for the convolution.
pub const AUTOMATON_SHADER: &str = r#"
struct Field {
    field_width: u32,
    field_height: u32,
    kernel_width: u32,
    kernel_height: u32,
    kernel_mult: f32,
    seed: u32,
    _pad0: u32,
    _pad1: u32,
};

struct Cursor {
    rad_sqr: f32,
    fill: f32,
    x: i32,
    y: i32,
    offset_x: u32,
    offset_y: u32,
    _pad0: u32,
    _pad1: u32,
};

@group(0) @binding(0) var<uniform> cfg: Field;
@group(0) @binding(1) var<storage, read_write> from_buffer: array<f32>;
@group(0) @binding(2) var<storage, read_write> to_buffer: array<f32>;
@group(0) @binding(3) var<storage, read> weights: array<f32>;
@group(0) @binding(4) var out_tex: texture_storage_2d<rgba8unorm, write>;
@group(0) @binding(5) var<uniform> cursor: Cursor;

const TILE: u32 = 32u;
const SPAN: u32 = 2u;

fn pcg(v: u32) -> u32 {
    let state = v * 747796405u + 2891336453u;
    let word = ((state >> ((state >> 28u) + 4u)) ^ state) * 277803737u;
    return (word >> 22u) ^ word;
}

fn wrap(v: i32, n: u32) -> u32 {
    let m = i32(n);
    return u32(((v % m) + m) % m);
}

fn cell(origin: vec2<u32>, lid: vec3<u32>, dx: u32, dy: u32) -> vec2<u32> {
    return vec2<u32>(origin.x + lid.x * SPAN + dx, origin.y + lid.y * SPAN + dy);
}

fn inside(c: vec2<u32>) -> bool {
    return c.x < cfg.field_width && c.y < cfg.field_height;
}

fn convolve(c: vec2<u32>) -> f32 {
    let hw = i32(cfg.kernel_width / 2u);
    let hh = i32(cfg.kernel_height / 2u);
    var acc = 0.0;
    for (var j = 0u; j < cfg.kernel_height; j++) {
        let sy = wrap(i32(c.y) + i32(j) - hh, cfg.field_height);
        for (var i = 0u; i < cfg.kernel_width; i++) {
            let sx = wrap(i32(c.x) + i32(i) - hw, cfg.field_width);
            acc += weights[i + j * cfg.kernel_width] * from_buffer[sx + sy * cfg.field_width];
        }
    }
    return acc * cfg.kernel_mult;
}

@compute @workgroup_size(16, 16, 1)
fn noise_fill(@builtin(workgroup_id) wg: vec3<u32>, @builtin(local_invocation_id) lid: vec3<u32>) {
    let origin = wg.xy * TILE;
    let salt = pcg(cfg.seed);
    for (var dy = 0u; dy < SPAN; dy++) {
        for (var dx = 0u; dx < SPAN; dx++) {
            let c = cell(origin, lid, dx, dy);
            if (!inside(c)) {
                continue;
            }
            let idx = c.x + c.y * cfg.field_width;
            from_buffer[idx] = f32(pcg(idx ^ salt)) / 4294967295.0;
        }
    }
}

@compute @workgroup_size(16, 16, 1)
fn iterate(@builtin(workgroup_id) wg: vec3<u32>, @builtin(local_invocation_id) lid: vec3<u32>) {
    let origin = wg.xy * TILE;
    for (var dy = 0u; dy < SPAN; dy++) {
        for (var dx = 0u; dx < SPAN; dx++) {
            let c = cell(origin, lid, dx, dy);
            if (!inside(c)) {
                continue;
            }
            let idx = c.x + c.y * cfg.field_width;
            to_buffer[idx] = clamp(from_buffer[idx] + convolve(c), 0.0, 1.0);
        }
    }
}

@compute @workgroup_size(16, 16, 1)
fn render(@builtin(workgroup_id) wg: vec3<u32>, @builtin(local_invocation_id) lid: vec3<u32>) {
    let origin = wg.xy * TILE;
    for (var dy = 0u; dy < SPAN; dy++) {
        for (var dx = 0u; dx < SPAN; dx++) {
            let c = cell(origin, lid, dx, dy);
            if (!inside(c)) {
                continue;
            }
            let v = clamp(to_buffer[c.x + c.y * cfg.field_width], 0.0, 1.0);
            let color = vec4<f32>(v * 0.9, v * v, 0.25 + 0.75 * v, 1.0);
            textureStore(out_tex, vec2<i32>(c), color);
        }
    }
}

@compute @workgroup_size(16, 16, 1)
fn cursor_draw(@builtin(workgroup_id) wg: vec3<u32>, @builtin(local_invocation_id) lid: vec3<u32>) {
    let origin = vec2<u32>(cursor.offset_x, cursor.offset_y) + wg.xy * TILE;
    for (var dy = 0u; dy < SPAN; dy++) {
        for (var dx = 0u; dx < SPAN; dx++) {
            let c = cell(origin, lid, dx, dy);
            if (!inside(c)) {
                continue;
            }
            let d = vec2<f32>(f32(i32(c.x) - cursor.x), f32(i32(c.y) - cursor.y));
            if (dot(d, d) <= cursor.rad_sqr) {
                from_buffer[c.x + c.y * cfg.field_width] = cursor.fill;
            }
        }
    }
}
"#;

/// WGSL for drawing the render target over the whole surface.
pub const PRESENT_SHADER: &str = r#"
struct VsOut {
    @builtin(position) pos: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(@builtin(vertex_index) vi: u32) -> VsOut {
    var p = array<vec2<f32>, 3>(
        vec2<f32>(-1.0, -3.0),
        vec2<f32>( 3.0,  1.0),
        vec2<f32>(-1.0,  1.0)
    );
    var uv = array<vec2<f32>, 3>(
        vec2<f32>(0.0, 2.0),
        vec2<f32>(2.0, 0.0),
        vec2<f32>(0.0, 0.0)
    );
    var out: VsOut;
    out.pos = vec4<f32>(p[vi], 0.0, 1.0);
    out.uv = uv[vi];
    return out;
}

@group(0) @binding(0) var samp: sampler;
@group(0) @binding(1) var tex: texture_2d<f32>;

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
    return textureSample(tex, samp, in.uv);
}
"#;

/// Entry point names, in the order the engine builds their pipelines.
pub const ENTRY_POINTS: [&str; 4] = ["noise_fill", "iterate", "render", "cursor_draw"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_entry_point_is_declared() {
        for name in ENTRY_POINTS {
            assert!(
                AUTOMATON_SHADER.contains(&format!("fn {name}(")),
                "missing entry point {name}"
            );
        }
    }

    #[test]
    fn workgroup_covers_one_tile() {
        // 16 invocations x 2 cells = 32 cells per axis
        assert!(AUTOMATON_SHADER.contains("@workgroup_size(16, 16, 1)"));
        assert!(AUTOMATON_SHADER.contains("const SPAN: u32 = 2u;"));
        assert_eq!(16 * 2, ringlife_common::TILE_SIZE);
    }
}
