//! Per-step extraction pass.
//!
//! For every locally owned element, every side is run through the puncture
//! detector and, when punctured, the zero locator. Elements with at least one
//! punctured side land in the step's [`PuncturedIndex`]; the located zeros are
//! also flattened into the step's [`PointCloud`].
//!
//! Each element depends only on its own samples, so with the `rayon` feature
//! [`VortexExtractor::extract_par`] spreads elements over the thread pool and
//! collects records in a concurrent map before ordering them into the index.

use crate::config::ExtractorConfig;
use crate::debug_invariants::DebugInvariants;
use crate::extract::index::PuncturedIndex;
use crate::extract::puncture::detect_puncture;
use crate::extract::punctured_elem::PuncturedElem;
use crate::extract::zero::find_zero;
use crate::io::point_cloud::PointCloud;
use crate::mesh::FieldMesh;
use crate::mesh::ids::ElemId;
use crate::vortex_error::VortexError;

/// Everything one extraction pass produces.
#[derive(Clone, Debug, PartialEq)]
pub struct StepExtraction {
    pub timestep: i32,
    pub index: PuncturedIndex,
    pub points: PointCloud,
    /// Punctured sides whose zero could not be located.
    pub unlocated: usize,
}

#[derive(Clone, Debug, Default)]
pub struct VortexExtractor {
    config: ExtractorConfig,
}

impl VortexExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    #[inline]
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    pub fn set_verbose(&mut self, level: i32) {
        self.config.verbose = level;
    }

    pub fn set_magnetic_field(&mut self, b: [f64; 3]) {
        self.config.magnetic_field = b;
    }

    pub fn set_kex(&mut self, kex: f64) {
        self.config.kex = kex;
    }

    pub fn set_gauge_transformation(&mut self, gauge: bool) {
        self.config.gauge = gauge;
    }

    pub fn set_flux(&mut self, flux: f64) {
        self.config.flux = flux;
    }

    #[inline]
    fn verbose(&self) -> bool {
        self.config.verbose > 0
    }

    /// Detect and locate the punctures of every side of one element.
    ///
    /// The returned record may have no punctured side; callers decide whether
    /// to keep it.
    pub fn extract_elem<M>(&self, mesh: &M, elem: ElemId) -> Result<PuncturedElem, VortexError>
    where
        M: FieldMesh + ?Sized,
    {
        let n_faces = mesh.n_faces(elem)?;
        let mut record = PuncturedElem::new(elem, n_faces)?;
        for face in 0..n_faces {
            let samples = mesh.face_samples(elem, face)?;
            let Some(puncture) = detect_puncture(&samples, &self.config) else {
                continue;
            };
            let point = find_zero(&puncture.samples);
            if point.is_none() {
                log::warn!(
                    "punctured but singularity not found: elem={elem} face={face} chirality={}",
                    puncture.chirality
                );
            }
            record.set_punctured(face, puncture.chirality, point)?;
        }
        Ok(record)
    }

    /// Serial extraction over the mesh's local elements.
    ///
    /// Any mesh or field access failure aborts the pass for this step.
    pub fn extract<M>(&self, mesh: &M) -> Result<StepExtraction, VortexError>
    where
        M: FieldMesh + ?Sized,
    {
        let timestep = mesh.timestep();
        if self.verbose() {
            log::info!(
                "extracting singularities on mesh faces... timestep={timestep} elems={}",
                mesh.n_elems()
            );
        }
        let mut index = PuncturedIndex::new(timestep);
        for elem in mesh.local_elems() {
            let record = self.extract_elem(mesh, elem)?;
            if record.valid() {
                log::debug!("elem_id={elem}, bits={record}");
                index.insert(record);
            }
        }
        Ok(self.finish(index))
    }

    /// Parallel extraction; produces exactly what [`Self::extract`] produces.
    #[cfg(feature = "rayon")]
    pub fn extract_par<M>(&self, mesh: &M) -> Result<StepExtraction, VortexError>
    where
        M: FieldMesh + Sync + ?Sized,
    {
        use dashmap::DashMap;
        use rayon::prelude::*;

        let timestep = mesh.timestep();
        if self.verbose() {
            log::info!(
                "extracting singularities on mesh faces (parallel)... timestep={timestep} elems={}",
                mesh.n_elems()
            );
        }
        let elems: Vec<ElemId> = mesh.local_elems().collect();
        let found: DashMap<ElemId, PuncturedElem> = DashMap::with_capacity(elems.len() / 8);
        elems.par_iter().try_for_each(|&elem| {
            let record = self.extract_elem(mesh, elem)?;
            if record.valid() {
                found.insert(elem, record);
            }
            Ok::<(), VortexError>(())
        })?;

        let mut index = PuncturedIndex::new(timestep);
        for (elem, record) in found.into_iter() {
            log::debug!("elem_id={elem}, bits={record}");
            index.insert(record);
        }
        Ok(self.finish(index))
    }

    fn finish(&self, index: PuncturedIndex) -> StepExtraction {
        index.debug_assert_invariants();
        let points = index.point_cloud();
        let unlocated = index.unlocated().count();
        if unlocated > 0 {
            log::warn!(
                "timestep {}: {unlocated} punctured faces without a located singularity",
                index.timestep()
            );
        }
        if self.verbose() {
            log::info!(
                "timestep {}: {} punctured elements, total number of singularities: {}",
                index.timestep(),
                index.len(),
                points.len()
            );
        }
        StepExtraction {
            timestep: index.timestep(),
            index,
            points,
            unlocated,
        }
    }
}
