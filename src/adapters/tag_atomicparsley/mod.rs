// AtomicParsley adapter - Metadata tagging

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::MixtapeResult;
use crate::ports::{MetadataTag, TagPort, TagTarget, ToolRunner};

/// Flag and value for one tag
fn tag_args(tag: &MetadataTag) -> [OsString; 2] {
    match tag {
        MetadataTag::Artwork(path) => ["--artwork".into(), path.as_os_str().to_owned()],
        MetadataTag::Title(value) => ["--title".into(), value.into()],
        MetadataTag::Artist(value) => ["--artist".into(), value.into()],
        MetadataTag::TvSeasonNum(value) => ["--TVSeasonNum".into(), value.into()],
        MetadataTag::TvEpisodeNum(value) => ["--TVEpisodeNum".into(), value.into()],
        MetadataTag::TvShowName(value) => ["--TVShowName".into(), value.into()],
        MetadataTag::TvEpisode(value) => ["--TVEpisode".into(), value.into()],
        MetadataTag::MediaKind(value) => ["--stik".into(), value.into()],
    }
}

/// AtomicParsley-based tagging adapter
pub struct AtomicParsleyAdapter {
    runner: Arc<dyn ToolRunner>,
    atomicparsley: PathBuf,
}

impl AtomicParsleyAdapter {
    pub fn new(runner: Arc<dyn ToolRunner>, atomicparsley: PathBuf) -> Self {
        Self {
            runner,
            atomicparsley,
        }
    }

    pub fn tag_command(file: &Path, tags: &[MetadataTag], target: &TagTarget) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![file.as_os_str().to_owned()];
        match target {
            TagTarget::InPlace => args.push("--overWrite".into()),
            TagTarget::Copy(output) => {
                args.push("--output".into());
                args.push(output.as_os_str().to_owned());
            }
        }
        for tag in tags {
            args.extend(tag_args(tag));
        }
        args
    }
}

impl TagPort for AtomicParsleyAdapter {
    fn write_tags(&self, file: &Path, tags: &[MetadataTag], target: &TagTarget) -> MixtapeResult<()> {
        let args = Self::tag_command(file, tags, target);
        self.runner.run("atomicparsley", &self.atomicparsley, &args)?;
        Ok(())
    }
}
