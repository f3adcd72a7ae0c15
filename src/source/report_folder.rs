use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::{AlignmentPolicy, ReportLayout};
use crate::data::{DetectionCounts, RawSample};
use crate::errors::PipelineError;
use crate::source::detections::read_detection_counts;
use crate::source::indexing::date_helpers::extract_date;
use crate::source::{Extraction, ExtractionStats, SampleSource};
use crate::transport::fs::{
    FolderListing, is_image_file, is_json_file, is_text_file, select_with_prefix,
};
use crate::types::SourceId;
use crate::utils::clean_text;

/// Configuration for a report-folder source.
#[derive(Clone, Debug)]
pub struct ReportFolderConfig {
    /// Stable source identifier used in logs.
    pub source_id: SourceId,
    /// Root directory holding the layout folders.
    pub root: PathBuf,
    /// Folder names under `root`.
    pub layout: ReportLayout,
    /// Metadata/frame alignment rule.
    pub alignment: AlignmentPolicy,
    /// Whether to follow symlinks when listing folders.
    pub follow_links: bool,
}

impl ReportFolderConfig {
    /// Create a config for `root`; the source id is the root's display path.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            source_id: root.display().to_string(),
            root,
            layout: ReportLayout::default(),
            alignment: AlignmentPolicy::default(),
            follow_links: true,
        }
    }

    /// Override the source id.
    pub fn with_source_id(mut self, source_id: impl Into<SourceId>) -> Self {
        self.source_id = source_id.into();
        self
    }

    /// Override the folder layout.
    pub fn with_layout(mut self, layout: ReportLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Override the alignment policy.
    pub fn with_alignment(mut self, alignment: AlignmentPolicy) -> Self {
        self.alignment = alignment;
        self
    }

    /// Override whether symlinks are followed.
    pub fn with_follow_links(mut self, follow_links: bool) -> Self {
        self.follow_links = follow_links;
        self
    }
}

/// Sorted file lists for one root, read once per extraction.
struct RootFiles {
    captions: Vec<PathBuf>,
    final_images: Vec<PathBuf>,
    air_pressure_images: Vec<PathBuf>,
    metadata: Vec<PathBuf>,
}

/// Extracts one `RawSample` per caption file under a report root.
pub struct ReportFolderSource {
    config: ReportFolderConfig,
}

impl ReportFolderSource {
    /// Create a source from configuration.
    pub fn new(config: ReportFolderConfig) -> Self {
        Self { config }
    }

    /// Convenience constructor using the default layout.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self::new(ReportFolderConfig::new(root))
    }

    fn listing(&self, folder: &str) -> FolderListing {
        FolderListing::new(self.config.root.join(folder))
            .with_follow_symlinks(self.config.follow_links)
    }

    fn required(&self, folder: &str) -> Result<FolderListing, PipelineError> {
        let listing = self.listing(folder);
        if !listing.exists() {
            return Err(PipelineError::MissingLayout {
                root: self.config.root.clone(),
                folder: folder.to_string(),
            });
        }
        Ok(listing)
    }

    fn root_files(&self) -> Result<RootFiles, PipelineError> {
        let layout = &self.config.layout;
        let text = self.required(&layout.text_dir)?;
        let final_images = self.required(&layout.final_image_dir)?;
        let metadata = self.required(&layout.metadata_dir)?;
        let air_pressure = self.listing(&layout.air_pressure_image_dir);
        if !air_pressure.exists() {
            debug!(
                "[wxprep:extract] {} has no '{}' folder; samples carry satellite frames only",
                self.config.source_id, layout.air_pressure_image_dir
            );
        }
        Ok(RootFiles {
            captions: text.files().into_iter().filter(|p| is_text_file(p)).collect(),
            final_images: final_images.files(),
            air_pressure_images: air_pressure.files(),
            metadata: metadata.files(),
        })
    }

    fn build_sample(
        &self,
        files: &RootFiles,
        caption_path: &Path,
        stats: &mut ExtractionStats,
    ) -> Option<RawSample> {
        let Some(basename) = caption_path.file_stem().and_then(|stem| stem.to_str()) else {
            warn!(
                "[wxprep:extract] skipping caption with non UTF-8 name: {}",
                caption_path.display()
            );
            stats.unreadable_captions += 1;
            return None;
        };

        let caption = match fs::read_to_string(caption_path) {
            Ok(raw) => clean_text(raw.trim()),
            Err(err) => {
                warn!(
                    "[wxprep:extract] skipping unreadable caption {}: {}",
                    caption_path.display(),
                    err
                );
                stats.unreadable_captions += 1;
                return None;
            }
        };

        let air_pressure = select_with_prefix(&files.air_pressure_images, basename, is_image_file);
        let satellite = select_with_prefix(&files.final_images, basename, is_image_file);
        let satellite_count = satellite.len();
        let mut image = air_pressure;
        image.extend(satellite);

        let mut image_metadata = self.collect_metadata(files, basename, stats);

        if image.is_empty() {
            debug!("[wxprep:extract] no frames match '{}'; dropping", basename);
            stats.dropped_without_images += 1;
            return None;
        }

        match self.config.alignment {
            AlignmentPolicy::Strict if image_metadata.len() != satellite_count => {
                warn!(
                    "[wxprep:extract] '{}' has {} metadata entries for {} satellite frames; dropping",
                    basename,
                    image_metadata.len(),
                    satellite_count
                );
                stats.dropped_misaligned += 1;
                return None;
            }
            AlignmentPolicy::Permissive if image_metadata.len() > image.len() => {
                warn!(
                    "[wxprep:extract] '{}' has {} metadata entries for {} frames; keeping the first {}",
                    basename,
                    image_metadata.len(),
                    image.len(),
                    image.len()
                );
                image_metadata.truncate(image.len());
                stats.metadata_truncated += 1;
            }
            _ => {}
        }

        let reportdate = match extract_date(basename) {
            Ok(date) => date,
            Err(err) => {
                warn!("[wxprep:extract] '{}': {}", basename, err);
                stats.malformed_dates += 1;
                None
            }
        };

        Some(RawSample {
            image,
            text: caption,
            filename: basename.to_string(),
            reportdate,
            image_metadata,
        })
    }

    fn collect_metadata(
        &self,
        files: &RootFiles,
        basename: &str,
        stats: &mut ExtractionStats,
    ) -> Vec<DetectionCounts> {
        let mut entries = Vec::new();
        for path in select_with_prefix(&files.metadata, basename, is_json_file) {
            match read_detection_counts(&path) {
                Ok(counts) => entries.extend(counts),
                Err(err) => {
                    warn!("[wxprep:extract] ignoring metadata file: {}", err);
                    stats.malformed_metadata += 1;
                }
            }
        }
        entries
    }
}

impl SampleSource for ReportFolderSource {
    fn id(&self) -> &str {
        &self.config.source_id
    }

    fn extract(&self) -> Result<Extraction, PipelineError> {
        let files = self.root_files()?;
        let mut stats = ExtractionStats::default();
        let mut samples = Vec::new();
        for caption_path in &files.captions {
            stats.captions += 1;
            if let Some(sample) = self.build_sample(&files, caption_path, &mut stats) {
                samples.push(sample);
            }
        }
        stats.emitted = samples.len();
        info!(
            "[wxprep:extract] {}: {} samples from {} captions",
            self.config.source_id, stats.emitted, stats.captions
        );
        Ok(Extraction { samples, stats })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::layout::{
        AIR_PRESSURE_IMAGE_DIR, FINAL_IMAGE_DIR, METADATA_DIR, TEXT_DIR,
    };
    use tempfile::{TempDir, tempdir};

    fn layout_root() -> TempDir {
        let temp = tempdir().unwrap();
        for folder in [TEXT_DIR, FINAL_IMAGE_DIR, AIR_PRESSURE_IMAGE_DIR, METADATA_DIR] {
            fs::create_dir_all(temp.path().join(folder)).unwrap();
        }
        temp
    }

    fn write(root: &Path, folder: &str, name: &str, body: &str) -> PathBuf {
        let path = root.join(folder).join(name);
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn builds_sample_with_pressure_maps_before_satellite_frames() {
        let temp = layout_root();
        let root = temp.path();
        write(root, TEXT_DIR, "20240513_report.txt", "สภาพอากาศ\nเนื้อหา จริง");
        let final_b = write(root, FINAL_IMAGE_DIR, "20240513_report_2.jpg", "");
        let final_a = write(root, FINAL_IMAGE_DIR, "20240513_report_1.PNG", "");
        let air = write(root, AIR_PRESSURE_IMAGE_DIR, "20240513_report_0.jpeg", "");
        write(root, FINAL_IMAGE_DIR, "20240513_report_notes.gif", "");
        write(root, FINAL_IMAGE_DIR, "20240520_report_1.jpg", "");
        write(
            root,
            METADATA_DIR,
            "20240513_report.json",
            r#"{"b.jpg": {"detections": [{"class_id": 0}]}, "a.jpg": {"detections": [{"class_id": 1}]}}"#,
        );

        let extraction = ReportFolderSource::at(root).extract().unwrap();
        assert_eq!(extraction.samples.len(), 1);
        let sample = &extraction.samples[0];
        assert_eq!(sample.filename, "20240513_report");
        assert_eq!(sample.text, "เนื้อหา จริง");
        assert_eq!(sample.reportdate.as_deref(), Some("13 พฤษภาคม 2567"));
        assert_eq!(sample.image, vec![air, final_a, final_b]);
        assert_eq!(
            sample.image_metadata,
            vec![
                DetectionCounts { cloudy: 1, typhoon: 0 },
                DetectionCounts { cloudy: 0, typhoon: 1 },
            ]
        );
        assert_eq!(sample.pressure_map_count(), 1);
    }

    #[test]
    fn metadata_files_are_read_in_name_order() {
        let temp = layout_root();
        let root = temp.path();
        write(root, TEXT_DIR, "r.txt", "ข้อความ");
        write(root, FINAL_IMAGE_DIR, "r_1.jpg", "");
        write(root, FINAL_IMAGE_DIR, "r_2.jpg", "");
        write(root, METADATA_DIR, "r_b.json", r#"{"x": {"detections": [{"class_id": 1}]}}"#);
        write(root, METADATA_DIR, "r_a.json", r#"{"y": {"detections": [{"class_id": 0}]}}"#);

        let extraction = ReportFolderSource::at(root).extract().unwrap();
        assert_eq!(
            extraction.samples[0].image_metadata,
            vec![
                DetectionCounts { cloudy: 1, typhoon: 0 },
                DetectionCounts { cloudy: 0, typhoon: 1 },
            ]
        );
    }

    #[test]
    fn captions_without_frames_are_dropped_silently() {
        let temp = layout_root();
        let root = temp.path();
        write(root, TEXT_DIR, "20240101_alone.txt", "ไม่มีภาพ");
        write(root, TEXT_DIR, "20240102_pair.txt", "มีภาพ");
        write(root, FINAL_IMAGE_DIR, "20240102_pair_1.jpg", "");

        let extraction = ReportFolderSource::at(root).extract().unwrap();
        assert_eq!(extraction.samples.len(), 1);
        assert_eq!(extraction.samples[0].filename, "20240102_pair");
        assert_eq!(extraction.stats.captions, 2);
        assert_eq!(extraction.stats.dropped_without_images, 1);
        assert_eq!(extraction.stats.emitted, 1);
    }

    #[test]
    fn missing_required_folder_fails_the_root() {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join(TEXT_DIR)).unwrap();
        fs::create_dir_all(temp.path().join(FINAL_IMAGE_DIR)).unwrap();

        let err = ReportFolderSource::at(temp.path()).extract().unwrap_err();
        assert!(matches!(
            err,
            PipelineError::MissingLayout { ref folder, .. } if folder == METADATA_DIR
        ));
    }

    #[test]
    fn missing_air_pressure_folder_is_tolerated() {
        let temp = layout_root();
        let root = temp.path();
        fs::remove_dir(root.join(AIR_PRESSURE_IMAGE_DIR)).unwrap();
        write(root, TEXT_DIR, "r.txt", "ข้อความ");
        let frame = write(root, FINAL_IMAGE_DIR, "r_1.jpg", "");

        let extraction = ReportFolderSource::at(root).extract().unwrap();
        assert_eq!(extraction.samples[0].image, vec![frame]);
    }

    #[test]
    fn malformed_metadata_and_dates_only_affect_that_element() {
        let temp = layout_root();
        let root = temp.path();
        write(root, TEXT_DIR, "20241340_r.txt", "ข้อความ");
        write(root, FINAL_IMAGE_DIR, "20241340_r_1.jpg", "");
        write(root, METADATA_DIR, "20241340_r_a.json", "{not json");
        write(
            root,
            METADATA_DIR,
            "20241340_r_b.json",
            r#"{"x": {"detections": [{"class_id": 0}]}}"#,
        );

        let extraction = ReportFolderSource::at(root).extract().unwrap();
        let sample = &extraction.samples[0];
        assert_eq!(sample.reportdate, None);
        assert_eq!(sample.image_metadata, vec![DetectionCounts { cloudy: 1, typhoon: 0 }]);
        assert_eq!(extraction.stats.malformed_dates, 1);
        assert_eq!(extraction.stats.malformed_metadata, 1);
    }

    #[test]
    fn permissive_alignment_trims_excess_metadata() {
        let temp = layout_root();
        let root = temp.path();
        write(root, TEXT_DIR, "r.txt", "ข้อความ");
        write(root, FINAL_IMAGE_DIR, "r_1.jpg", "");
        write(
            root,
            METADATA_DIR,
            "r.json",
            r#"{"a": {"detections": []}, "b": {"detections": []}, "c": {"detections": []}}"#,
        );

        let extraction = ReportFolderSource::at(root).extract().unwrap();
        let sample = &extraction.samples[0];
        assert_eq!(sample.image_metadata.len(), 1);
        assert_eq!(extraction.stats.metadata_truncated, 1);
    }

    #[test]
    fn strict_alignment_drops_mismatched_samples() {
        let temp = layout_root();
        let root = temp.path();
        write(root, TEXT_DIR, "ok.txt", "ข้อความ");
        write(root, FINAL_IMAGE_DIR, "ok_1.jpg", "");
        write(root, METADATA_DIR, "ok.json", r#"{"a": {"detections": []}}"#);
        write(root, TEXT_DIR, "short.txt", "ข้อความ");
        write(root, FINAL_IMAGE_DIR, "short_1.jpg", "");
        write(root, FINAL_IMAGE_DIR, "short_2.jpg", "");
        write(root, METADATA_DIR, "short.json", r#"{"a": {"detections": []}}"#);

        let source = ReportFolderSource::new(
            ReportFolderConfig::new(root).with_alignment(AlignmentPolicy::Strict),
        );
        let extraction = source.extract().unwrap();
        let names: Vec<&str> = extraction
            .samples
            .iter()
            .map(|sample| sample.filename.as_str())
            .collect();
        assert_eq!(names, vec!["ok"]);
        assert_eq!(extraction.stats.dropped_misaligned, 1);
    }

    #[test]
    fn custom_layout_and_source_id_are_honored() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        for folder in ["captions", "sat", "meta"] {
            fs::create_dir_all(root.join(folder)).unwrap();
        }
        write(root, "captions", "r.txt", "ข้อความ");
        write(root, "sat", "r_1.jpg", "");

        let layout = ReportLayout {
            text_dir: "captions".into(),
            final_image_dir: "sat".into(),
            air_pressure_image_dir: "pressure".into(),
            metadata_dir: "meta".into(),
        };
        let source = ReportFolderSource::new(
            ReportFolderConfig::new(root)
                .with_layout(layout)
                .with_source_id("weekly"),
        );
        assert_eq!(source.id(), "weekly");
        assert_eq!(source.extract().unwrap().samples.len(), 1);
    }
}
