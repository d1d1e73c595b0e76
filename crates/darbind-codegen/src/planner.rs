//! Two-pass orchestration over a DAR's DALFs.
//!
//! Pass 1 collects interfaces from every DALF into the shared index, because
//! a template in one DALF may implement an interface defined in another.
//! Pass 2 decodes each DALF in full, injects the interfaces of its modules,
//! resolves name collisions against everything emitted so far, and finalizes
//! a [`Package`] per DALF.
//!
//! DALFs are processed in lexicographic path order and struct names in
//! lexicographic order within a DALF; the collision resolver depends on both
//! for run-to-run determinism.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info, warn};

use darbind_core::{ExternalPackages, Manifest, Package};
use darbind_parser::{decoder_for_version, DarReader};

use crate::dalf_path::{package_id_from_path, package_name_from_path, strip_version_suffix};
use crate::dedup::{resolve_collisions, rewrite_references};
use crate::error::CodegenError;
use crate::interfaces::InterfaceIndex;

pub struct Planner<'a> {
    dar: &'a mut DarReader,
    manifest: &'a Manifest,
    external_packages: ExternalPackages,
}

impl<'a> Planner<'a> {
    pub fn new(
        dar: &'a mut DarReader,
        manifest: &'a Manifest,
        external_packages: ExternalPackages,
    ) -> Self {
        Self {
            dar,
            manifest,
            external_packages,
        }
    }

    /// Run both passes and return a finalized [`Package`] per DALF path.
    pub fn run(&mut self) -> Result<BTreeMap<String, Package>, CodegenError> {
        let mut worklist = self.manifest.dalf_worklist();
        worklist.sort();

        let index = self.collect_interfaces(&worklist);
        self.finalize_dalfs(&worklist, &index)
    }

    /// Pass 1. A DALF that cannot be opened, read, or decoded is logged and
    /// skipped; a missing interface only degrades the output, while pass 2
    /// treats the same conditions as fatal.
    fn collect_interfaces(&mut self, worklist: &[String]) -> InterfaceIndex {
        let mut index = InterfaceIndex::new();

        for dalf in worklist {
            let payload = match self.dar.open(dalf) {
                Ok(payload) => payload,
                Err(err) => {
                    warn!("failed to open dalf '{dalf}': {err}");
                    continue;
                }
            };

            let mut decoder = match decoder_for_version(
                &self.manifest.sdk_version,
                payload,
                ExternalPackages::default(),
            ) {
                Ok(decoder) => decoder,
                Err(err) => {
                    warn!("failed to select decoder for dalf '{dalf}': {err}");
                    continue;
                }
            };

            let interfaces = match decoder.interfaces() {
                Ok(interfaces) => interfaces,
                Err(err) => {
                    warn!("failed to extract interfaces from dalf '{dalf}': {err}");
                    continue;
                }
            };

            // InterfaceMap iteration is ordered, so index insertion (and
            // with it the rename suffixes) is deterministic.
            for (_, interface) in interfaces {
                index.insert(interface);
            }
        }

        index
    }

    /// Pass 2.
    fn finalize_dalfs(
        &mut self,
        worklist: &[String],
        index: &InterfaceIndex,
    ) -> Result<BTreeMap<String, Package>, CodegenError> {
        let mut emitted_names = BTreeSet::new();
        let mut packages = BTreeMap::new();

        for dalf in worklist {
            let payload = self.dar.open(dalf)?;
            let mut decoder = decoder_for_version(
                &self.manifest.sdk_version,
                payload,
                self.external_packages.clone(),
            )?;

            let (mut structs, imported) = decoder.template_structs(index.by_module())?;

            // Emit the interfaces of every module this DALF touches
            // alongside its own declarations.
            let modules: BTreeSet<String> = structs
                .values()
                .map(|s| s.module_name.clone())
                .filter(|m| !m.is_empty())
                .collect();
            info!("adding interfaces for dalf {dalf} from modules: {modules:?}");
            for module_name in &modules {
                if let Some(interfaces) = index.module(module_name) {
                    for (name, interface) in interfaces {
                        debug!("adding interface {name} from module {module_name} to output");
                        structs.insert(name.clone(), interface.clone());
                    }
                }
            }

            let renamed = resolve_collisions(&mut structs, &mut emitted_names);
            rewrite_references(&mut structs, &renamed);

            let package_id = package_id_from_path(&self.manifest.main_dalf)
                .ok_or_else(|| CodegenError::MissingPackageId(self.manifest.main_dalf.clone()))?;

            let package_name = if self.manifest.name.is_empty() {
                package_name_from_path(&self.manifest.main_dalf)
            } else {
                self.manifest.name.clone()
            };
            let package_name = strip_version_suffix(&package_name);

            let mut imported_packages: Vec<_> = imported.packages.into_values().collect();
            imported_packages.sort_by(|a, b| a.import.cmp(&b.import));

            packages.insert(
                dalf.clone(),
                Package {
                    name: package_name,
                    package_id,
                    structs,
                    imported_packages,
                    sdk_version: self.manifest.sdk_version.clone(),
                    is_main_dalf: dalf == &self.manifest.main_dalf,
                },
            );
        }

        Ok(packages)
    }
}
