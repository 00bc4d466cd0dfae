use std::f64::consts::TAU;

use bevy::image::{ImageAddressMode, ImageFilterMode, ImageSampler, ImageSamplerDescriptor};
use bevy::prelude::*;
use bevy::render::render_asset::RenderAssetUsages;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use noise::{Fbm, MultiFractal, NoiseFn, Perlin};

/// Base cloth colour (sRGB), a card-table green
const FELT: [f32; 3] = [0.11, 0.36, 0.21];

/// Threads across the texture; even so the over/under pattern tiles
const WEAVE_THREADS: f32 = 96.0;

/// Radius of the torus the noise is sampled on; larger means finer grain
const NOISE_RADIUS: f64 = 1.6;

/// Parameters for procedural fabric generation
#[derive(Clone, Debug)]
pub struct FabricParams {
    pub size: u32,
    pub seed: u32,
    pub octaves: usize,
    pub persistence: f64,
}

impl Default for FabricParams {
    fn default() -> Self {
        Self {
            size: 512,
            seed: 7,
            octaves: 4,
            persistence: 0.5,
        }
    }
}

/// Generate RGBA8 (sRGB) texels of a woven felt that tiles in both directions
pub fn fabric_pixels(params: &FabricParams) -> Vec<u8> {
    let size = params.size.max(1);
    let fbm = Fbm::<Perlin>::new(params.seed)
        .set_octaves(params.octaves)
        .set_persistence(params.persistence);

    let mut data = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        let v = y as f64 / size as f64;
        for x in 0..size {
            let u = x as f64 / size as f64;

            // Sampling on a 4D torus keeps the noise seamless at the edges
            let sample = fbm.get([
                NOISE_RADIUS * (TAU * u).cos(),
                NOISE_RADIUS * (TAU * u).sin(),
                NOISE_RADIUS * (TAU * v).cos(),
                NOISE_RADIUS * (TAU * v).sin(),
            ]);
            let grain = (0.5 + 0.5 * sample as f32).clamp(0.0, 1.0);

            let shade = 0.8 + 0.12 * weave(u as f32, v as f32) + 0.16 * (grain - 0.5);
            for channel in FELT {
                data.push(((channel * shade).clamp(0.0, 1.0) * 255.0).round() as u8);
            }
            data.push(255);
        }
    }
    data
}

/// Plain-weave thread profile in 0..=1 at texture coordinate (u, v)
fn weave(u: f32, v: f32) -> f32 {
    let warp = u * WEAVE_THREADS;
    let weft = v * WEAVE_THREADS;
    let over = (warp.floor() as i64 + weft.floor() as i64) % 2 == 0;
    let thread = if over { warp } else { weft };
    (thread * std::f32::consts::PI).sin().abs()
}

/// Build a repeating, filtered floor texture from [`fabric_pixels`]
pub fn fabric_texture(params: &FabricParams) -> Image {
    let size = params.size.max(1);
    let mut image = Image::new(
        Extent3d {
            width: size,
            height: size,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        fabric_pixels(params),
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::RENDER_WORLD,
    );

    image.sampler = ImageSampler::Descriptor(ImageSamplerDescriptor {
        address_mode_u: ImageAddressMode::Repeat,
        address_mode_v: ImageAddressMode::Repeat,
        mag_filter: ImageFilterMode::Linear,
        min_filter: ImageFilterMode::Linear,
        mipmap_filter: ImageFilterMode::Linear,
        ..default()
    });

    image
}
