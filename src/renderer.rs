//! Shader-based Earth rendering.
//!
//! A fullscreen quad whose fragment shader ray-casts the planet, the cloud
//! shell, the atmosphere halo and a procedural star field from the camera
//! basis in [`FrameParams`].

use eframe::glow;
use glow::HasContext as _;
use nalgebra::Matrix3;
use std::collections::HashMap;

use crate::error::RendererError;
use crate::scene::FrameParams;
use crate::texture::{EarthTexture, TextureKind};

const VERTEX_SHADER: &str = r#"
    const vec2 verts[4] = vec2[4](
        vec2(-1.0, -1.0),
        vec2( 1.0, -1.0),
        vec2(-1.0,  1.0),
        vec2( 1.0,  1.0)
    );
    out vec2 v_uv;
    void main() {
        v_uv = verts[gl_VertexID] * 0.5 + 0.5;
        gl_Position = vec4(verts[gl_VertexID], 0.0, 1.0);
    }
"#;

const FRAGMENT_SHADER: &str = r#"
    precision highp float;
    in vec2 v_uv;
    out vec4 out_color;

    uniform sampler2D u_day;
    uniform sampler2D u_clouds;
    uniform sampler2D u_normal;
    uniform mat3 u_body_inv;
    uniform mat3 u_cloud_inv;
    uniform vec3 u_cam_pos;
    uniform vec3 u_cam_forward;
    uniform vec3 u_cam_right;
    uniform vec3 u_cam_up;
    uniform float u_tan_half_fov;
    uniform float u_aspect;
    uniform vec3 u_sun_dir;
    uniform vec3 u_sun_color;
    uniform float u_ambient;
    uniform float u_directional;
    uniform vec3 u_rim_dir;
    uniform vec3 u_rim_color;
    uniform float u_rim_intensity;
    uniform float u_show_clouds;
    uniform float u_clouds_opacity;
    uniform float u_show_atmosphere;
    uniform float u_atmosphere_glow;

    const float PI = 3.14159265359;
    const float EARTH_RADIUS = 2.0;
    const float CLOUD_RADIUS = 2.03;
    const float ATMO_RADIUS = 2.3;
    const vec3 ATMO_COLOR = vec3(0.267, 0.667, 1.0);

    bool hit_sphere(vec3 o, vec3 d, float r, out float t_near, out float t_far) {
        float b = dot(o, d);
        float c = dot(o, o) - r * r;
        float disc = b * b - c;
        if (disc < 0.0) {
            t_near = 0.0;
            t_far = 0.0;
            return false;
        }
        float s = sqrt(disc);
        t_near = -b - s;
        t_far = -b + s;
        return t_far > 0.0;
    }

    // Equirectangular lookup matching the usual sphere mesh layout:
    // u = 0.5 on +X inverted, north pole at the top of the image.
    vec2 sphere_uv(vec3 p) {
        float u = atan(p.z, -p.x) / (2.0 * PI);
        if (u < 0.0) u += 1.0;
        float v = acos(clamp(p.y, -1.0, 1.0)) / PI;
        return vec2(u, v);
    }

    vec3 to_linear(vec3 c) {
        return pow(c, vec3(2.2));
    }

    vec3 irradiance(vec3 n) {
        vec3 e = vec3(u_ambient);
        e += u_directional * max(dot(n, u_sun_dir), 0.0) * to_linear(u_sun_color);
        e += u_rim_intensity * max(dot(n, u_rim_dir), 0.0) * to_linear(u_rim_color);
        return e;
    }

    vec3 surface_tangent(vec3 n) {
        vec3 t = cross(vec3(0.0, 1.0, 0.0), n);
        float len = length(t);
        return len > 1e-4 ? t / len : vec3(1.0, 0.0, 0.0);
    }

    vec3 shade_body(vec3 p) {
        vec3 local = u_body_inv * normalize(p);
        vec2 uv = sphere_uv(local);
        vec3 albedo = to_linear(texture(u_day, uv).rgb);
        vec3 nm = texture(u_normal, uv).rgb * 2.0 - 1.0;
        vec3 t = surface_tangent(local);
        vec3 b = cross(local, t);
        vec3 local_n = normalize(t * nm.x + b * nm.y + local * nm.z);
        vec3 n = transpose(u_body_inv) * local_n;
        return albedo * irradiance(n) / PI;
    }

    vec3 shade_clouds(vec3 p, float facing) {
        vec3 n = normalize(p);
        vec3 local = u_cloud_inv * n;
        vec3 cover = to_linear(texture(u_clouds, sphere_uv(local)).rgb);
        return cover * irradiance(n * facing) / PI * u_clouds_opacity;
    }

    vec3 aces_filmic(vec3 color) {
        const mat3 input_mat = mat3(
            vec3(0.59719, 0.07600, 0.02840),
            vec3(0.35458, 0.90834, 0.13383),
            vec3(0.04823, 0.01566, 0.83777)
        );
        const mat3 output_mat = mat3(
            vec3( 1.60475, -0.10208, -0.00327),
            vec3(-0.53108,  1.10813, -0.07276),
            vec3(-0.07367, -0.00605,  1.07602)
        );
        color /= 0.6;
        color = input_mat * color;
        vec3 a = color * (color + 0.0245786) - 0.000090537;
        vec3 b = color * (0.983729 * color + 0.4329510) + 0.238081;
        color = output_mat * (a / b);
        return clamp(color, 0.0, 1.0);
    }

    float hash(vec3 p) {
        return fract(sin(dot(p, vec3(127.1, 311.7, 74.7))) * 43758.5453);
    }

    float star_field(vec3 dir) {
        vec3 p = dir * 220.0;
        vec3 cell = floor(p);
        float h = hash(cell);
        if (h < 0.985) return 0.0;
        vec3 jitter = vec3(hash(cell + 1.3), hash(cell + 7.1), hash(cell + 3.7)) - 0.5;
        float d = length(fract(p) - 0.5 - jitter * 0.6);
        return (1.0 - smoothstep(0.0, 0.12, d)) * (h - 0.985) / 0.015;
    }

    void main() {
        vec2 ndc = v_uv * 2.0 - 1.0;
        vec3 rd = normalize(
            u_cam_forward
            + ndc.x * u_aspect * u_tan_half_fov * u_cam_right
            + ndc.y * u_tan_half_fov * u_cam_up
        );
        vec3 ro = u_cam_pos;

        vec3 hdr = vec3(0.0);
        float e0, e1;
        bool earth = hit_sphere(ro, rd, EARTH_RADIUS, e0, e1) && e0 > 0.0;
        if (earth) {
            hdr = shade_body(ro + rd * e0);
        }

        if (u_show_clouds > 0.5) {
            float c0, c1;
            if (hit_sphere(ro, rd, CLOUD_RADIUS, c0, c1)) {
                if (c0 > 0.0) hdr += shade_clouds(ro + rd * c0, 1.0);
                if (!earth) hdr += shade_clouds(ro + rd * c1, -1.0);
            }
        }

        vec3 color = pow(aces_filmic(hdr), vec3(1.0 / 2.2));

        if (!earth) {
            if (u_show_atmosphere > 0.5) {
                float a0, a1;
                if (hit_sphere(ro, rd, ATMO_RADIUS, a0, a1)) {
                    vec3 n = normalize(ro + rd * a1);
                    float f = pow(max(0.75 - dot(n, -u_cam_forward), 0.0), 3.5);
                    color += ATMO_COLOR * f * u_atmosphere_glow;
                }
            }
            color += vec3(star_field(rd));
        }

        out_color = vec4(clamp(color, 0.0, 1.0), 1.0);
    }
"#;

/// Texture unit per layer.
fn texture_unit(kind: TextureKind) -> (u32, i32, &'static str) {
    match kind {
        TextureKind::Day => (glow::TEXTURE0, 0, "u_day"),
        TextureKind::Clouds => (glow::TEXTURE1, 1, "u_clouds"),
        TextureKind::Normal => (glow::TEXTURE2, 2, "u_normal"),
    }
}

/// Column-major upload order for a GLSL `mat3`.
fn mat3_data(m: &Matrix3<f64>) -> [f32; 9] {
    [
        m[(0, 0)] as f32, m[(1, 0)] as f32, m[(2, 0)] as f32,
        m[(0, 1)] as f32, m[(1, 1)] as f32, m[(2, 1)] as f32,
        m[(0, 2)] as f32, m[(1, 2)] as f32, m[(2, 2)] as f32,
    ]
}

/// Rim intensity is divided by distance raised to this power.
const RIM_FALLOFF_EXPONENT: i32 = 2;
/// Floor on the falloff divisor so a light at the origin stays finite.
const RIM_MIN_FALLOFF: f32 = 0.01;

/// Rim light direction and its intensity after inverse-square falloff.
fn rim_uniforms(params: &FrameParams) -> ([f32; 3], [f32; 3], f32) {
    match params.lighting.rim {
        Some(rim) => {
            let [x, y, z] = rim.position;
            let dist = (x * x + y * y + z * z).sqrt();
            let len = dist.max(f32::EPSILON);
            let falloff = dist.powi(RIM_FALLOFF_EXPONENT).max(RIM_MIN_FALLOFF);
            ([x / len, y / len, z / len], rim.color, rim.intensity / falloff)
        }
        None => ([0.0, 0.0, 1.0], [0.0; 3], 0.0),
    }
}

fn flag(on: bool) -> f32 {
    if on { 1.0 } else { 0.0 }
}

pub struct SphereRenderer {
    program: glow::Program,
    vertex_array: glow::VertexArray,
    textures: HashMap<TextureKind, glow::Texture>,
}

impl SphereRenderer {
    pub fn new(gl: &glow::Context) -> Result<Self, RendererError> {
        let shader_version = "#version 330";

        unsafe {
            let program = gl.create_program()
                .map_err(|reason| RendererError::Create { what: "program", reason })?;

            let shader_sources = [
                (glow::VERTEX_SHADER, VERTEX_SHADER),
                (glow::FRAGMENT_SHADER, FRAGMENT_SHADER),
            ];

            let mut shaders = Vec::with_capacity(shader_sources.len());
            for (shader_type, shader_source) in shader_sources {
                let shader = gl.create_shader(shader_type)
                    .map_err(|reason| RendererError::Create { what: "shader", reason })?;
                gl.shader_source(shader, &format!("{shader_version}\n{shader_source}"));
                gl.compile_shader(shader);
                if !gl.get_shader_compile_status(shader) {
                    let log = gl.get_shader_info_log(shader);
                    gl.delete_shader(shader);
                    gl.delete_program(program);
                    return Err(RendererError::Compile(log));
                }
                gl.attach_shader(program, shader);
                shaders.push(shader);
            }

            gl.link_program(program);
            let linked = gl.get_program_link_status(program);

            for shader in shaders {
                gl.detach_shader(program, shader);
                gl.delete_shader(shader);
            }
            if !linked {
                let log = gl.get_program_info_log(program);
                gl.delete_program(program);
                return Err(RendererError::Link(log));
            }

            let vertex_array = gl.create_vertex_array()
                .map_err(|reason| RendererError::Create { what: "vertex array", reason })?;

            let mut renderer = Self {
                program,
                vertex_array,
                textures: HashMap::new(),
            };
            for kind in TextureKind::ALL {
                renderer.upload(gl, kind, &kind.placeholder())?;
            }
            Ok(renderer)
        }
    }

    /// Replaces the texture bound to `kind`.
    pub fn upload(&mut self, gl: &glow::Context, kind: TextureKind, tex: &EarthTexture) -> Result<(), RendererError> {
        unsafe {
            let texture = gl.create_texture()
                .map_err(|reason| RendererError::Create { what: "texture", reason })?;
            gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGB as i32,
                tex.width as i32,
                tex.height as i32,
                0,
                glow::RGB,
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(Some(&tex.rgb_bytes())),
            );
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, glow::LINEAR as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::REPEAT as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::CLAMP_TO_EDGE as i32);
            if let Some(old) = self.textures.insert(kind, texture) {
                gl.delete_texture(old);
            }
        }
        Ok(())
    }

    pub fn paint(&self, gl: &glow::Context, params: &FrameParams) {
        let program = self.program;
        let loc = |name: &str| unsafe { gl.get_uniform_location(program, name) };
        let cam = &params.camera;
        let vec3 = |v: &nalgebra::Vector3<f64>| [v.x as f32, v.y as f32, v.z as f32];
        let (rim_dir, rim_color, rim_intensity) = rim_uniforms(params);

        unsafe {
            gl.use_program(Some(program));
            gl.bind_vertex_array(Some(self.vertex_array));

            for (kind, texture) in &self.textures {
                let (unit, index, name) = texture_unit(*kind);
                gl.active_texture(unit);
                gl.bind_texture(glow::TEXTURE_2D, Some(*texture));
                gl.uniform_1_i32(loc(name).as_ref(), index);
            }

            gl.uniform_matrix_3_f32_slice(loc("u_body_inv").as_ref(), false, &mat3_data(&params.body_inv_rotation));
            gl.uniform_matrix_3_f32_slice(loc("u_cloud_inv").as_ref(), false, &mat3_data(&params.cloud_inv_rotation));

            let [px, py, pz] = vec3(&cam.position);
            let [fx, fy, fz] = vec3(&cam.forward);
            let [rx, ry, rz] = vec3(&cam.right);
            let [ux, uy, uz] = vec3(&cam.up);
            gl.uniform_3_f32(loc("u_cam_pos").as_ref(), px, py, pz);
            gl.uniform_3_f32(loc("u_cam_forward").as_ref(), fx, fy, fz);
            gl.uniform_3_f32(loc("u_cam_right").as_ref(), rx, ry, rz);
            gl.uniform_3_f32(loc("u_cam_up").as_ref(), ux, uy, uz);
            gl.uniform_1_f32(loc("u_tan_half_fov").as_ref(), cam.tan_half_fov as f32);
            gl.uniform_1_f32(loc("u_aspect").as_ref(), params.aspect);

            let [sx, sy, sz] = params.sun_dir;
            let [scr, scg, scb] = crate::lighting::SUN_COLOR;
            gl.uniform_3_f32(loc("u_sun_dir").as_ref(), sx, sy, sz);
            gl.uniform_3_f32(loc("u_sun_color").as_ref(), scr, scg, scb);
            gl.uniform_1_f32(loc("u_ambient").as_ref(), params.lighting.ambient);
            gl.uniform_1_f32(loc("u_directional").as_ref(), params.lighting.directional);
            gl.uniform_3_f32(loc("u_rim_dir").as_ref(), rim_dir[0], rim_dir[1], rim_dir[2]);
            gl.uniform_3_f32(loc("u_rim_color").as_ref(), rim_color[0], rim_color[1], rim_color[2]);
            gl.uniform_1_f32(loc("u_rim_intensity").as_ref(), rim_intensity);

            gl.uniform_1_f32(loc("u_show_clouds").as_ref(), flag(params.show_clouds));
            gl.uniform_1_f32(loc("u_clouds_opacity").as_ref(), params.clouds_opacity);
            gl.uniform_1_f32(loc("u_show_atmosphere").as_ref(), flag(params.show_atmosphere));
            gl.uniform_1_f32(loc("u_atmosphere_glow").as_ref(), params.atmosphere_glow);

            gl.disable(glow::BLEND);
            gl.draw_arrays(glow::TRIANGLE_STRIP, 0, 4);
            gl.enable(glow::BLEND);
        }
    }

    pub fn destroy(&self, gl: &glow::Context) {
        unsafe {
            gl.delete_program(self.program);
            gl.delete_vertex_array(self.vertex_array);
            for texture in self.textures.values() {
                gl.delete_texture(*texture);
            }
        }
    }
}
