use std::error::Error;
use std::time::Instant;

use clap::Parser;
use image::RgbImage;
use log::info;

mod raytracing;
use raytracing::{Color, Scene, SolidObject, Sphere, Vec3, REFRACTION_GLASS, REFRACTION_WATER};

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// the path where the rendered image is saved
    #[arg(short, long, default_value = "output.png")]
    output: String,
    /// output image width in pixels
    #[arg(long, default_value_t = 640)]
    width: usize,
    /// output image height in pixels
    #[arg(long, default_value_t = 480)]
    height: usize,
    /// camera zoom factor
    #[arg(short, long, default_value_t = 4.5)]
    zoom: f64,
    /// supersampling factor, traces factor^2 rays per output pixel
    #[arg(short, long, default_value_t = 3)]
    anti_alias: usize,
}

/// Three spheres exercising the whole lighting model: matte, mirror gloss
/// and refracting glass, under two colored lights.
fn build_demo_scene() -> Result<Scene, Box<dyn Error>> {
    let mut scene = Scene::new(Color::new(0.01, 0.02, 0.04));

    let mut matte = Sphere::new(Vec3::new(-2.7, -1.2, -26.0), 2.0);
    matte.set_full_matte(Color::new(0.6, 0.1, 0.1))?;
    scene.add_solid_object(Box::new(matte));

    let mut mirror = Sphere::new(Vec3::new(2.8, -0.4, -32.0), 2.4);
    mirror.set_matte_gloss_balance(0.85, Color::new(0.2, 0.2, 0.2), Color::new(0.9, 0.9, 0.9))?;
    scene.add_solid_object(Box::new(mirror));

    let mut glass = Sphere::new(Vec3::new(0.2, 1.4, -19.0), 1.5);
    glass.set_matte_gloss_balance(0.3, Color::new(0.4, 0.45, 0.5), Color::new(0.8, 0.8, 0.8))?;
    glass.set_opacity(0.15)?;
    glass.set_refraction(REFRACTION_GLASS)?;
    scene.add_solid_object(Box::new(glass));

    let mut droplet = Sphere::new(Vec3::new(-0.8, -2.2, -16.0), 0.7);
    droplet.set_matte_gloss_balance(0.4, Color::new(0.3, 0.4, 0.3), Color::new(0.7, 0.7, 0.7))?;
    droplet.set_opacity(0.1)?;
    droplet.set_refraction(REFRACTION_WATER)?;
    scene.add_solid_object(Box::new(droplet));

    scene.add_light_source(
        Vec3::new(-45.0, 10.0, 50.0),
        Color::new(1.0, 1.0, 0.3),
        "warm key",
    );
    scene.add_light_source(
        Vec3::new(5.0, 90.0, -40.0),
        Color::new(0.5, 0.5, 1.5),
        "cool overhead",
    );
    Ok(scene)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let scene = build_demo_scene()?;

    // measure time
    let start = Instant::now();
    let buffer = scene.render(args.width, args.height, args.zoom, args.anti_alias)?;
    let bytes = buffer.tone_mapped_bytes()?;
    let image = RgbImage::from_raw(args.width as u32, args.height as u32, bytes)
        .ok_or("pixel buffer does not match the requested image size")?;
    image.save(&args.output)?;

    let total_time = start.elapsed();
    info!("render finished in {total_time:?}");
    println!("Rendered {} in {:?}", args.output, total_time);
    Ok(())
}
