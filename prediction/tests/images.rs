mod support;

use image::{ImageBuffer, Luma};
use prediction::results::*;
use prediction::utils::config::Config;
use prediction::visualization::{BoxFormat, ImageprocPainter, Visualizer};
use common::utils::log_entry::argument::ArgumentEntry;
use support::*;

fn detection(confidence: Vec<f32>, labels: Vec<usize>) -> ImageDetectionPrediction {
    let bboxes = (0..labels.len())
        .map(|index| {
            let offset = 10.0 * index as f32;
            [offset, offset, offset + 20.0, offset + 20.0]
        })
        .collect();
    let prediction = DetectionPrediction::new(bboxes, BoxFormat::Xyxy, labels, confidence, (80, 100)).unwrap();
    ImageDetectionPrediction::new(gradient_image(100, 80), prediction, names(&["cat", "dog"]))
}

#[test]
fn detection_boxes_are_drawn_from_least_to_most_confident() {
    let (visualizer, painter, _) = recording_visualizer();
    detection(vec![0.9, 0.2, 0.5], vec![0, 1, 0])
        .draw(&visualizer, &DetectionDrawOptions::default())
        .unwrap();
    assert_eq!(painter.titles(), names(&["dog 0.20", "cat 0.50", "cat 0.90"]));
}

#[test]
fn hidden_confidence_and_class_subset_shape_titles() {
    let (visualizer, painter, _) = recording_visualizer();
    let options = DetectionDrawOptions {
        show_confidence: false,
        class_names: Some(names(&["dog"])),
        ..DetectionDrawOptions::default()
    };
    detection(vec![0.9, 0.2, 0.5], vec![0, 1, 0]).draw(&visualizer, &options).unwrap();
    assert_eq!(painter.titles(), names(&["dog "]));
}

#[test]
fn empty_class_subset_draws_every_class() {
    let (visualizer, painter, _) = recording_visualizer();
    let options = DetectionDrawOptions {
        class_names: Some(vec![]),
        ..DetectionDrawOptions::default()
    };
    detection(vec![0.9, 0.2], vec![0, 1]).draw(&visualizer, &options).unwrap();
    assert_eq!(painter.titles(), names(&["dog 0.20", "cat 0.90"]));
}

#[test]
fn box_corners_are_truncated_to_pixels() {
    let (visualizer, painter, _) = recording_visualizer();
    let prediction = DetectionPrediction::new(vec![[1.7, 2.6, 10.9, 12.5]], BoxFormat::Xyxy, vec![0], vec![0.5], (80, 100)).unwrap();
    let wrapper = ImageDetectionPrediction::new(gradient_image(100, 80), prediction, names(&["cat", "dog"]));
    wrapper.draw(&visualizer, &DetectionDrawOptions::default()).unwrap();
    let corners: Vec<_> = painter.calls.borrow().iter()
        .filter_map(|call| match call {
            PaintCall::Bbox(painted_box) => Some((painted_box.x1, painted_box.y1, painted_box.x2, painted_box.y2)),
            _ => None,
        })
        .collect();
    assert_eq!(corners, vec![(1, 2, 10, 12)]);
}

#[test]
fn draw_leaves_source_image_untouched() {
    let painter = ImageprocPainter::new(None, &Config::default());
    let (_, _, media) = recording_visualizer();
    let visualizer = Visualizer::new(Box::new(painter), Box::new(media));
    let wrapper = detection(vec![0.9, 0.6], vec![0, 1]);
    let before = wrapper.image.clone();
    let drawn = wrapper.draw(&visualizer, &DetectionDrawOptions::default()).unwrap();
    assert_eq!(wrapper.image, before);
    assert_ne!(drawn, before);
}

#[test]
fn unknown_display_class_is_rejected() {
    let (visualizer, painter, _) = recording_visualizer();
    let options = DetectionDrawOptions {
        class_names: Some(names(&["bird"])),
        ..DetectionDrawOptions::default()
    };
    let err = detection(vec![0.5], vec![0]).draw(&visualizer, &options).unwrap_err();
    assert_eq!(err.as_argument(), Some(&ArgumentEntry::InvalidClassNames(names(&["bird"]), names(&["cat", "dog"]))));
    assert!(painter.titles().is_empty());
}

#[test]
fn ground_truth_is_composed_side_by_side() {
    let (visualizer, painter, _) = recording_visualizer();
    let options = DetectionDrawOptions {
        target_bboxes: Some(vec![[0.5, 0.5, 0.75, 0.75]]),
        target_bboxes_format: Some("normalized_xyxy".to_string()),
        target_class_ids: Some(vec![1]),
        ..DetectionDrawOptions::default()
    };
    let drawn = detection(vec![0.7], vec![0]).draw(&visualizer, &options).unwrap();
    assert_eq!(drawn.dimensions(), (2 * (100 + 100 / 20), 80 + 80 / 8));
    assert_eq!(painter.titles(), names(&["cat 0.70", "dog"]));
    assert_eq!(painter.texts(), names(&["Predictions", "Ground Truth"]));
    let target_box = painter.calls.borrow().iter()
        .filter_map(|call| match call {
            PaintCall::Bbox(painted_box) if painted_box.title == "dog" => Some((painted_box.x1, painted_box.y1, painted_box.x2, painted_box.y2)),
            _ => None,
        })
        .next();
    assert_eq!(target_box, Some((50, 40, 75, 60)));
}

#[test]
fn empty_ground_truth_returns_predictions_only() {
    let (visualizer, painter, _) = recording_visualizer();
    let options = DetectionDrawOptions {
        target_bboxes: Some(vec![]),
        target_bboxes_format: Some("xyxy".to_string()),
        target_class_ids: Some(vec![]),
        ..DetectionDrawOptions::default()
    };
    let drawn = detection(vec![0.7], vec![0]).draw(&visualizer, &options).unwrap();
    assert_eq!(drawn.dimensions(), (100, 80));
    assert!(painter.texts().is_empty());
}

#[test]
fn invalid_ground_truth_arguments_are_rejected() {
    let (visualizer, _, _) = recording_visualizer();
    let wrapper = detection(vec![0.7], vec![0]);
    let missing_format = DetectionDrawOptions {
        target_bboxes: Some(vec![[0.0, 0.0, 1.0, 1.0]]),
        target_class_ids: Some(vec![0]),
        ..DetectionDrawOptions::default()
    };
    let err = wrapper.draw(&visualizer, &missing_format).unwrap_err();
    assert_eq!(err.as_argument(), Some(&ArgumentEntry::MissingTargetFormat));

    let unknown_format = DetectionDrawOptions {
        target_bboxes_format: Some("xyz".to_string()),
        ..missing_format.clone()
    };
    let err = wrapper.draw(&visualizer, &unknown_format).unwrap_err();
    assert_eq!(err.as_argument(), Some(&ArgumentEntry::UnknownBoxFormat("xyz".to_string())));

    let mismatched = DetectionDrawOptions {
        target_bboxes_format: Some("xyxy".to_string()),
        target_class_ids: Some(vec![0, 1]),
        ..missing_format
    };
    let err = wrapper.draw(&visualizer, &mismatched).unwrap_err();
    assert_eq!(err.as_argument(), Some(&ArgumentEntry::TargetLengthMismatch(1, 2)));
}

#[test]
fn short_color_mapping_is_rejected() {
    let (visualizer, _, _) = recording_visualizer();
    let options = DetectionDrawOptions {
        color_mapping: Some(vec![image::Rgb([255, 0, 0])]),
        ..DetectionDrawOptions::default()
    };
    let err = detection(vec![0.7], vec![0]).draw(&visualizer, &options).unwrap_err();
    assert_eq!(err.as_argument(), Some(&ArgumentEntry::ColorMappingTooShort(1, 2)));
}

#[test]
fn classification_label_follows_confidence_flag() {
    let (visualizer, painter, media) = recording_visualizer();
    let wrapper = ImageClassificationPrediction::new(
        gradient_image(8, 8),
        ClassificationPrediction::new(1, 0.75),
        names(&["cat", "dog"]),
    );
    wrapper.show(&visualizer, &ClassificationDrawOptions::default()).unwrap();
    wrapper.draw(&visualizer, &ClassificationDrawOptions { show_confidence: false }).unwrap();
    assert_eq!(*painter.calls.borrow(), vec![
        PaintCall::Label("dog".to_string(), Some(0.75)),
        PaintCall::Label("dog".to_string(), None),
    ]);
    assert_eq!(*media.shown_images.borrow(), 1);

    let unknown = ImageClassificationPrediction::new(gradient_image(8, 8), ClassificationPrediction::new(5, 0.1), names(&["cat"]));
    let err = unknown.draw(&visualizer, &ClassificationDrawOptions::default()).unwrap_err();
    assert_eq!(err.as_argument(), Some(&ArgumentEntry::UnknownClassId(5, 1)));
}

fn segmentation(class_names: Vec<String>) -> ImageSegmentationPrediction {
    let segmentation_map = ImageBuffer::from_fn(6, 4, |x, _| Luma([(x % 2) as u16]));
    ImageSegmentationPrediction::new(gradient_image(6, 4), SegmentationPrediction::new(segmentation_map), class_names)
}

#[test]
fn single_class_segmentation_gains_background() {
    let (visualizer, painter, _) = recording_visualizer();
    segmentation(names(&["foreground"])).draw(&visualizer, &SegmentationDrawOptions::default()).unwrap();
    assert_eq!(*painter.calls.borrow(), vec![PaintCall::Overlay {
        num_classes: 2,
        alpha: 0.6,
        colors: 2,
        class_names: names(&["background", "foreground"]),
    }]);
}

#[test]
fn empty_segmentation_subset_uses_vocabulary() {
    let (visualizer, painter, _) = recording_visualizer();
    let options = SegmentationDrawOptions { class_names: Some(vec![]), ..SegmentationDrawOptions::default() };
    segmentation(names(&["road", "car", "sky"])).draw(&visualizer, &options).unwrap();
    assert_eq!(*painter.calls.borrow(), vec![PaintCall::Overlay {
        num_classes: 3,
        alpha: 0.6,
        colors: 3,
        class_names: names(&["road", "car", "sky"]),
    }]);
}

#[test]
fn segmentation_rejects_bad_alpha_and_mask_shape() {
    let (visualizer, _, _) = recording_visualizer();
    let options = SegmentationDrawOptions { alpha: 1.5, ..SegmentationDrawOptions::default() };
    let err = segmentation(names(&["a", "b"])).draw(&visualizer, &options).unwrap_err();
    assert_eq!(err.as_argument(), Some(&ArgumentEntry::InvalidAlpha(1.5)));

    let mismatched = ImageSegmentationPrediction::new(
        gradient_image(5, 4),
        SegmentationPrediction::new(ImageBuffer::new(6, 4)),
        names(&["a", "b"]),
    );
    let err = mismatched.draw(&visualizer, &SegmentationDrawOptions::default()).unwrap_err();
    assert_eq!(err.as_argument(), Some(&ArgumentEntry::MaskShapeMismatch(6, 4, 5, 4)));
}

#[test]
fn collection_save_writes_one_file_per_image() {
    let (visualizer, _, media) = recording_visualizer();
    let folder = tempfile::tempdir().unwrap();
    let output_folder = folder.path().join("predictions");
    let images: ImagesPredictions<_> = vec![
        segmentation(names(&["a", "b"])),
        segmentation(names(&["a", "b"])),
        segmentation(names(&["a", "b"])),
    ].into();
    images.save(&visualizer, &output_folder, &SegmentationDrawOptions::default()).unwrap();

    let mut files: Vec<String> = std::fs::read_dir(&output_folder).unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    files.sort();
    assert_eq!(files, names(&["pred_0.jpg", "pred_1.jpg", "pred_2.jpg"]));
    assert_eq!(media.saved_images.borrow().len(), 3);
}

#[test]
fn detection_collection_forwards_targets_per_image() {
    let (visualizer, painter, media) = recording_visualizer();
    let folder = tempfile::tempdir().unwrap();
    let images: ImagesPredictions<_> = vec![detection(vec![0.4], vec![0]), detection(vec![0.8], vec![1])].into();
    let options = ImagesDetectionOptions {
        target_bboxes: Some(Targets::Batch(vec![vec![[1.0, 1.0, 5.0, 5.0]], vec![]])),
        target_bboxes_format: Some("xyxy".to_string()),
        target_class_ids: Some(Targets::Batch(vec![vec![1], vec![]])),
        ..ImagesDetectionOptions::default()
    };
    images.save(&visualizer, folder.path(), &options).unwrap();
    assert_eq!(painter.titles(), names(&["cat 0.40", "dog", "dog 0.80"]));
    assert_eq!(painter.texts(), names(&["Predictions", "Ground Truth"]));
    assert_eq!(media.saved_images.borrow().len(), 2);

    let first = image::open(folder.path().join("pred_0.jpg")).unwrap();
    assert_eq!((first.width(), first.height()), (210, 90));
}

#[test]
fn detection_collection_validates_before_output() {
    let (visualizer, _, media) = recording_visualizer();
    let folder = tempfile::tempdir().unwrap();
    let output_folder = folder.path().join("never");
    let images: ImagesPredictions<_> = vec![detection(vec![0.4], vec![0])].into();
    let options = ImagesDetectionOptions {
        target_bboxes: Some(Targets::Single(vec![[1.0, 1.0, 5.0, 5.0]])),
        ..ImagesDetectionOptions::default()
    };
    let err = images.save(&visualizer, &output_folder, &options).unwrap_err();
    assert_eq!(err.as_argument(), Some(&ArgumentEntry::PartialTargetArguments));
    assert!(!output_folder.exists());
    assert!(media.saved_images.borrow().is_empty());

    let err = images.show(&visualizer, &ImagesDetectionOptions {
        class_names: Some(names(&["bird"])),
        ..ImagesDetectionOptions::default()
    }).unwrap_err();
    assert!(matches!(err.as_argument(), Some(ArgumentEntry::InvalidClassNames(_, _))));
}
