use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::codec;
use crate::compositing::compose_page;
use crate::config::{ComposeConfig, PageIndexPolicy};
use crate::error::{MaskPackerError, Result};
use crate::mask_index::MaskSource;
use crate::model::Page;

/// Outcome of one page job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageReport {
    /// Page name as written in the atlas.
    pub page: String,
    /// Position of the page in the atlas.
    pub index: usize,
    /// Image written (or, for a dry run, that would be written).
    pub output: PathBuf,
    pub painted: usize,
    /// Sprites without a matching mask.
    pub skipped: Vec<String>,
}

/// Output file names for `pages`, in page order.
///
/// Each name is `<base>_<suffix>.<ext>` with `base` the file stem of the page name. The
/// two-digit page index is appended according to `cfg.page_index`. A name still taken by an
/// earlier page (`b` indexed next to a page literally named `b_00`) gets the page index again
/// until it is free, so no two pages of one atlas share a name.
pub fn output_file_names(pages: &[Page], cfg: &ComposeConfig) -> Vec<String> {
    let bases: Vec<String> = pages.iter().map(|p| base_name(&p.name)).collect();
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for b in &bases {
        *seen.entry(b.as_str()).or_default() += 1;
    }
    let ext = cfg.format.extension();
    let mut taken: HashSet<String> = HashSet::with_capacity(bases.len());
    bases
        .iter()
        .enumerate()
        .map(|(i, base)| {
            let indexed = match cfg.page_index {
                PageIndexPolicy::Always => true,
                PageIndexPolicy::Auto => seen.get(base.as_str()).copied().unwrap_or(0) > 1,
            };
            let mut stem = if indexed {
                format!("{base}_{}_{i:02}", cfg.suffix)
            } else {
                format!("{base}_{}", cfg.suffix)
            };
            while taken.contains(&format!("{stem}.{ext}")) {
                stem = format!("{stem}_{i:02}");
            }
            let name = format!("{stem}.{ext}");
            taken.insert(name.clone());
            name
        })
        .collect()
}

/// Summary object for a run: `{ "pages": [...], "painted": n, "skipped": n }`.
pub fn reports_to_json(reports: &[PageReport]) -> serde_json::Value {
    let painted: usize = reports.iter().map(|r| r.painted).sum();
    let skipped: usize = reports.iter().map(|r| r.skipped.len()).sum();
    serde_json::json!({
        "pages": reports,
        "painted": painted,
        "skipped": skipped,
    })
}

fn base_name(page_name: &str) -> String {
    Path::new(page_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "page".into())
}

/// Composes every page and writes it to `out_dir` (created if missing).
///
/// Pages are independent jobs, run on the rayon pool when `cfg.parallel` is set and the
/// `parallel` feature is enabled. Every job runs to completion; afterwards either all
/// reports are returned in page order or the first failure in page order, wrapped in
/// [`MaskPackerError::Job`]. Pages that succeeded stay on disk either way.
#[instrument(skip_all, fields(pages = pages.len(), out = %out_dir.display()))]
pub fn pack_masks<M>(
    pages: &[Page],
    masks: &M,
    cfg: &ComposeConfig,
    out_dir: &Path,
) -> Result<Vec<PageReport>>
where
    M: MaskSource + ?Sized,
{
    cfg.validate()?;
    fs::create_dir_all(out_dir)?;

    let jobs = page_jobs(pages, cfg, out_dir);
    let start = Instant::now();
    let results = run_jobs(&jobs, cfg.parallel, |job| {
        run_page(job, masks, cfg).map_err(|e| MaskPackerError::Job {
            page: job.page.name.clone(),
            source: Box::new(e),
        })
    });
    let reports: Result<Vec<PageReport>> = results.into_iter().collect();
    let reports = reports?;
    info!(
        pages = reports.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "all pages written"
    );
    Ok(reports)
}

/// Reports what [`pack_masks`] would do without loading masks or writing anything.
pub fn dry_run<M>(pages: &[Page], masks: &M, cfg: &ComposeConfig, out_dir: &Path) -> Vec<PageReport>
where
    M: MaskSource + ?Sized,
{
    page_jobs(pages, cfg, out_dir)
        .into_iter()
        .map(|job| {
            let (found, missing): (Vec<_>, Vec<_>) =
                job.page.sprites.iter().partition(|s| masks.has_mask(&s.name));
            PageReport {
                page: job.page.name.clone(),
                index: job.index,
                output: job.output,
                painted: found.len(),
                skipped: missing.into_iter().map(|s| s.name.clone()).collect(),
            }
        })
        .collect()
}

struct PageJob<'a> {
    index: usize,
    page: &'a Page,
    output: PathBuf,
}

fn page_jobs<'a>(pages: &'a [Page], cfg: &ComposeConfig, out_dir: &Path) -> Vec<PageJob<'a>> {
    pages
        .iter()
        .zip(output_file_names(pages, cfg))
        .enumerate()
        .map(|(index, (page, name))| PageJob {
            index,
            page,
            output: out_dir.join(name),
        })
        .collect()
}

fn run_page<M>(job: &PageJob<'_>, masks: &M, cfg: &ComposeConfig) -> Result<PageReport>
where
    M: MaskSource + ?Sized,
{
    let composed = compose_page(job.page, masks, cfg)?;
    codec::save_page(&job.output, &composed.canvas, cfg.format)?;
    info!(
        page = %job.page.name,
        path = %job.output.display(),
        painted = composed.painted,
        skipped = composed.skipped.len(),
        "packed page"
    );
    Ok(PageReport {
        page: job.page.name.clone(),
        index: job.index,
        output: job.output.clone(),
        painted: composed.painted,
        skipped: composed.skipped,
    })
}

/// Runs `f` over every job and collects all results in job order.
fn run_jobs<T, R, F>(jobs: &[T], parallel: bool, f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        if parallel {
            return jobs.par_iter().map(&f).collect();
        }
    }
    #[cfg(not(feature = "parallel"))]
    let _ = parallel;
    jobs.iter().map(f).collect()
}
