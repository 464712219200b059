use super::*;
use crate::foundation::core::Color;
use std::path::PathBuf;

fn solid(width: u32, height: u32, rgb: [u8; 3]) -> FrameRGBA {
    let mut data = Vec::new();
    for _ in 0..width * height {
        data.extend_from_slice(&[rgb[0], rgb[1], rgb[2], 255]);
    }
    FrameRGBA {
        width,
        height,
        data,
        premultiplied: true,
    }
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("unit_observer").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

#[test]
fn exporter_creates_dir_and_names_by_index() {
    let dir = scratch_dir("exporter");
    let mut exporter = FrameExporter::new(&dir).unwrap();
    assert!(dir.is_dir());

    exporter
        .frame_complete(3, &solid(4, 2, [200, 10, 30]))
        .unwrap();

    let path = dir.join("3.png");
    assert_eq!(exporter.frame_path(3), path);
    let img = image::open(&path).unwrap().to_rgb8();
    assert_eq!(img.dimensions(), (4, 2));
    assert_eq!(img.get_pixel(1, 1).0, [200, 10, 30]);
}

#[test]
fn in_memory_frames_keep_arrival_order() {
    let mut frames = InMemoryFrames::new();
    assert!(frames.is_empty());
    frames.frame_complete(1, &solid(1, 1, [1, 1, 1])).unwrap();
    frames.frame_complete(2, &solid(1, 1, [2, 2, 2])).unwrap();
    assert_eq!(frames.indices(), vec![1, 2]);
    assert_eq!(frames.frames()[1].1.pixel_rgb(0, 0), Some(Color::rgb(2, 2, 2)));
}

#[test]
fn in_memory_clones_share_one_buffer() {
    let reader = InMemoryFrames::new();
    let mut attached = reader.clone();
    attached.frame_complete(5, &solid(2, 2, [9, 8, 7])).unwrap();
    assert_eq!(reader.len(), 1);
    assert_eq!(reader.indices(), vec![5]);
    assert_eq!(reader.frames()[0].1, solid(2, 2, [9, 8, 7]));
}

#[test]
fn closures_are_observers() {
    let mut seen = Vec::new();
    {
        let mut obs = |i: u64, _: &FrameRGBA| -> VisionResult<()> {
            seen.push(i);
            Ok(())
        };
        obs.frame_complete(7, &solid(1, 1, [0, 0, 0])).unwrap();
    }
    assert_eq!(seen, vec![7]);
}
