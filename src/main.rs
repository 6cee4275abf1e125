use std::path::PathBuf;

use dicom_roi::{enums::Orientation, volume_loader::VolumeLoader};

fn main() {
    env_logger::init();

    let directory = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("dicom"));

    let volume = VolumeLoader::load_from_directory(&directory)
        .expect("should have loaded files from directory");
    let (depth, height, width) = volume.dim();
    log::info!("loaded volume of {depth}x{height}x{width} from {}", directory.display());

    let image = volume
        .plane_image(depth / 2, Orientation::Axial)
        .expect("should have returned image at center of volume");
    image.save("result.png").expect("should have saved image");
}
