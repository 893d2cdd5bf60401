//! The source database: the registry of module wrappers, the file-set
//! index over the code base, and the fan-out point for change
//! notifications.

use std::rc::Rc;
use std::time::Instant;

use indexmap::{IndexMap, IndexSet};
use smol_str::SmolStr;

use crate::base::{DatabaseId, Dialect};
use crate::fragment::FileFragment;
use crate::resource::{WriteMode, WriteOutcome};

pub mod context;
pub mod error;
pub mod wrapper;

pub use context::{DEFAULT_MODULE_PATHS, NullPrompt, SourceContext, UserPrompt};
pub use error::{Result, SourceError};
pub use wrapper::ModuleWrapper;

use wrapper::new_virtual_module_id;

// ==== CHANGE OBSERVERS ====

/// A registered consumer of database change notifications.
pub trait Browser {
    /// Called after one module's tree changed, or after the whole file set
    /// changed (`changed` is `None` in that case). `is_external_change` is
    /// true when the change did not originate from this browser.
    fn all_changed(&self, is_external_change: bool, changed: Option<&FileFragment>);
}

/// A source of transient fragments that live outside any file, such as an
/// active change set. Searches consult these in addition to the wrapped
/// modules.
pub trait ChangeSetProvider {
    fn current_fragments(&self) -> Vec<FileFragment>;
}

// ==== DATABASE ====

/// File names never admitted into the database, whatever the listing says.
const REJECTED_FILE_NAMES: [&str; 1] = ["JSON.js"];

pub struct SourceDatabase {
    id: DatabaseId,
    ctx: SourceContext,
    modules: IndexMap<SmolStr, ModuleWrapper>,
    registered_browsers: Vec<Rc<dyn Browser>>,
    change_set_providers: Vec<Rc<dyn ChangeSetProvider>>,
    all_files: Option<IndexSet<SmolStr>>,
}

impl SourceDatabase {
    pub fn new(ctx: SourceContext) -> Self {
        Self {
            id: DatabaseId::fresh(),
            ctx,
            modules: IndexMap::new(),
            registered_browsers: Vec::new(),
            change_set_providers: Vec::new(),
            all_files: None,
        }
    }

    #[inline]
    pub fn id(&self) -> DatabaseId {
        self.id
    }

    #[inline]
    pub fn code_base(&self) -> &str {
        &self.ctx.code_base
    }

    // ==== NAME RESOLUTION ====

    /// Reduce a possibly path-qualified name to the relative form used as a
    /// registry key. A `../prefix/rest` name keeps `prefix/rest` when
    /// `prefix/` is one of the configured module paths, and drops down to
    /// `rest` otherwise.
    pub fn normalize_file_name(&self, file_name: &str) -> String {
        let Some(stripped) = file_name.strip_prefix("../") else {
            return file_name.to_string();
        };
        for path in &self.ctx.module_paths {
            if stripped.starts_with(path.as_str()) {
                return stripped.to_string();
            }
        }
        match stripped.split_once('/') {
            Some((_, rest)) => rest.to_string(),
            None => stripped.to_string(),
        }
    }

    pub fn find_module_wrapper_for_file_name(&self, file_name: &str) -> Option<&ModuleWrapper> {
        let key = self.normalize_file_name(file_name);
        self.modules.get(key.as_str())
    }

    // ==== MODULE REGISTRY ====

    /// Register a module for `file_name`, parsing it on first sight. With
    /// `source` given the cache is seeded from it, so no fetch hits the
    /// transport. Adding an already-registered file is a no-op.
    pub fn add_module(
        &mut self,
        file_name: &str,
        source: Option<String>,
        is_virtual: bool,
    ) -> Result<&ModuleWrapper> {
        let key = SmolStr::new(self.normalize_file_name(file_name));
        if !self.modules.contains_key(&key) {
            let mut wrapper = ModuleWrapper::for_file(&key, is_virtual, &self.ctx.parsers)?;
            if let Some(source) = source {
                wrapper.set_cached_source(source);
            }
            wrapper.retrieve_source_and_parse(&mut self.ctx, self.id)?;
            self.modules.insert(key.clone(), wrapper);
        }
        self.modules
            .get(&key)
            .ok_or_else(|| SourceError::not_found(key.as_str()))
    }

    /// Create and register a file-less module holding `source`. The module
    /// gets a generated name unless one is given.
    pub fn add_virtual_module(
        &mut self,
        module_name: Option<&str>,
        source: String,
        dialect: Dialect,
    ) -> Result<&ModuleWrapper> {
        let name = match module_name {
            Some(name) => name.to_string(),
            None => new_virtual_module_id(),
        };
        let mut wrapper = ModuleWrapper::new(
            crate::base::ModuleName::new(name),
            dialect,
            Some(source),
            true,
            &self.ctx.parsers,
        )?;
        wrapper.retrieve_source_and_parse(&mut self.ctx, self.id)?;
        let key = SmolStr::new(wrapper.file_name());
        let entry = self.modules.entry(key).or_insert(wrapper);
        Ok(entry)
    }

    /// Re-parse a registered module, optionally dropping it first to force
    /// a fresh fetch from the transport.
    ///
    /// A forced re-read is refused while the module waits on an overwrite
    /// decision; dropping the wrapper would lose the pending conflict.
    pub fn reparse_module(&mut self, file_name: &str, force_reread: bool) -> Result<&FileFragment> {
        let key = SmolStr::new(self.normalize_file_name(file_name));
        if force_reread {
            if let Some(wrapper) = self.modules.get(&key) {
                if wrapper.is_awaiting_overwrite_decision() {
                    return Err(SourceError::Conflict(key.to_string()));
                }
            }
            self.modules.shift_remove(&key);
        }
        let known = self.modules.contains_key(&key);
        self.add_module(&key, None, false)?;
        if known {
            let id = self.id;
            let wrapper = self
                .modules
                .get_mut(&key)
                .ok_or_else(|| SourceError::not_found(key.as_str()))?;
            return wrapper.retrieve_source_and_parse(&mut self.ctx, id);
        }
        // A wrapper created just now was already parsed by add_module.
        self.modules
            .get(&key)
            .and_then(ModuleWrapper::ast)
            .ok_or_else(|| SourceError::not_found(key.as_str()))
    }

    /// Parse `file_name` into a fragment tree without replacing the
    /// registered tree. With `text` given, that text is parsed; otherwise
    /// the module's current source is parsed and cached as its tree.
    pub fn parse_complete_file(
        &mut self,
        file_name: &str,
        text: Option<&str>,
    ) -> Result<FileFragment> {
        let id = self.id;
        let key = self.normalize_file_name(file_name);
        let wrapper = self
            .modules
            .get_mut(key.as_str())
            .ok_or_else(|| SourceError::not_found(file_name))?;
        match text {
            Some(text) => wrapper.parse(text, id),
            None => wrapper
                .retrieve_source_and_parse(&mut self.ctx, id)
                .cloned(),
        }
    }

    /// Update a module's text and persist it, normalizing line endings and
    /// registering the module if this is the first time the file is seen.
    pub fn put_source_code_for_file(&mut self, file_name: &str, source: &str) -> Result<()> {
        if file_name.is_empty() {
            return Err(SourceError::configuration(
                "cannot store source code without a file name",
            ));
        }
        let source = source.replace("\r\n", "\n").replace('\r', "\n");
        let key = SmolStr::new(self.normalize_file_name(file_name));
        if !self.modules.contains_key(&key) {
            let wrapper = ModuleWrapper::for_file(&key, false, &self.ctx.parsers)?;
            self.modules.insert(key.clone(), wrapper);
        }
        tracing::info!(file = %key, bytes = source.len(), "storing source code");
        let wrapper = self
            .modules
            .get_mut(&key)
            .ok_or_else(|| SourceError::not_found(key.as_str()))?;
        wrapper.set_source(source, WriteMode::Async, true, &mut self.ctx)
    }

    /// The cached text of a module. Unregistered names and modules with
    /// nothing cached yet both read as empty, so callers never handle
    /// absence specially.
    pub fn cached_text(&self, file_name: &str) -> String {
        self.find_module_wrapper_for_file_name(file_name)
            .and_then(ModuleWrapper::cached_source)
            .unwrap_or_default()
            .to_string()
    }

    pub fn root_fragment_for_module(&self, file_name: &str) -> Option<&FileFragment> {
        self.find_module_wrapper_for_file_name(file_name)
            .and_then(ModuleWrapper::ast)
    }

    pub fn all_module_wrappers(&self) -> impl Iterator<Item = &ModuleWrapper> {
        self.modules.values()
    }

    // ==== WRITE COMPLETIONS ====

    /// Route an asynchronous write completion to the owning wrapper.
    pub fn deliver_write_outcome(&mut self, outcome: WriteOutcome) -> Result<()> {
        let code_base = self.ctx.code_base.clone();
        let Some(position) = self
            .modules
            .values()
            .position(|w| w.file_url(&code_base) == outcome.location)
        else {
            tracing::warn!(location = %outcome.location, "write outcome for unknown module");
            return Ok(());
        };
        match self.modules.get_index_mut(position) {
            Some((_, wrapper)) => wrapper.complete_write(outcome.status, &mut self.ctx),
            None => Ok(()),
        }
    }

    /// Deliver the user's answer to a pending overwrite prompt.
    pub fn resolve_overwrite(&mut self, file_name: &str, overwrite: bool) -> Result<()> {
        let key = self.normalize_file_name(file_name);
        let wrapper = self
            .modules
            .get_mut(key.as_str())
            .ok_or_else(|| SourceError::not_found(file_name))?;
        wrapper.resolve_overwrite(overwrite, &mut self.ctx)
    }

    // ==== SEARCH ====

    /// Find every fragment whose own text (excluding child fragments)
    /// contains `needle`. Covers all parsed modules plus any registered
    /// change-set fragments.
    pub fn search_for(&self, needle: &str) -> Vec<FileFragment> {
        use rayon::prelude::*;
        use rustc_hash::FxHashSet;

        let candidates: Vec<(&ModuleWrapper, &FileFragment)> = self
            .modules
            .values()
            .filter_map(|w| w.ast().map(|ast| (w, ast)))
            .collect();

        let mut results: Vec<FileFragment> = candidates
            .par_iter()
            .flat_map_iter(|(wrapper, root)| {
                let source = wrapper.cached_source().unwrap_or_default();
                let mut seen: FxHashSet<(SmolStr, u32, u32, crate::fragment::FragmentKind)> =
                    FxHashSet::default();
                let mut hits = Vec::new();
                for fragment in root.flattened() {
                    let key = (
                        fragment.file_name().clone(),
                        fragment.range().start().into(),
                        fragment.range().end().into(),
                        fragment.kind(),
                    );
                    if !seen.insert(key) {
                        continue;
                    }
                    if fragment.own_source(source).contains(needle) {
                        hits.push(fragment.clone());
                    }
                }
                hits
            })
            .collect();

        for provider in &self.change_set_providers {
            for fragment in provider.current_fragments() {
                let source = self
                    .find_module_wrapper_for_file_name(fragment.file_name())
                    .and_then(ModuleWrapper::cached_source)
                    .unwrap_or_default();
                if fragment.own_source(source).contains(needle) {
                    results.push(fragment);
                }
            }
        }
        results
    }

    // ==== BROWSER NOTIFICATION ====

    pub fn register_browser(&mut self, browser: Rc<dyn Browser>) {
        self.registered_browsers.push(browser);
    }

    pub fn unregister_browser(&mut self, browser: &Rc<dyn Browser>) {
        self.registered_browsers
            .retain(|b| !Rc::ptr_eq(b, browser));
    }

    pub fn register_change_set_provider(&mut self, provider: Rc<dyn ChangeSetProvider>) {
        self.change_set_providers.push(provider);
    }

    /// Notify every registered browser except the originator of a change.
    pub fn update_browsers(
        &self,
        originator: Option<&Rc<dyn Browser>>,
        changed: Option<&FileFragment>,
    ) {
        let started = Instant::now();
        for browser in &self.registered_browsers {
            let is_originator = originator.is_some_and(|o| Rc::ptr_eq(o, browser));
            if is_originator {
                continue;
            }
            browser.all_changed(true, changed);
        }
        tracing::debug!(
            browsers = self.registered_browsers.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "notified browsers"
        );
    }

    // ==== FILE SET ====

    /// The set of interesting file names under the code base, computed
    /// lazily and cached until `update` invalidates it.
    pub fn all_files(&mut self) -> &IndexSet<SmolStr> {
        if self.all_files.is_none() {
            let files = self.interesting_file_names();
            self.all_files = Some(files);
        }
        self.all_files.get_or_insert_with(IndexSet::new)
    }

    fn interesting_file_names(&mut self) -> IndexSet<SmolStr> {
        let listing = match self.ctx.accessor.list(&self.ctx.code_base) {
            Ok(listing) => listing,
            Err(error) => {
                tracing::error!(%error, code_base = %self.ctx.code_base, "listing code base failed");
                return IndexSet::new();
            }
        };
        listing
            .into_iter()
            .filter(|name| Dialect::from_file_name(name).is_some())
            .filter(|name| !REJECTED_FILE_NAMES.contains(&name.as_str()))
            .map(SmolStr::new)
            .collect()
    }

    /// Drop the cached file set so the next `all_files` call relists.
    pub fn update(&mut self) {
        self.all_files = None;
    }

    /// Record a newly created file in the cached file set without a full
    /// relisting.
    pub fn add_file(&mut self, file_name: &str) {
        let key = SmolStr::new(self.normalize_file_name(file_name));
        if let Some(files) = &mut self.all_files {
            files.insert(key);
        }
    }

    /// Register and parse every interesting file under the code base.
    /// Individual failures are collected and reported together; the files
    /// that do parse stay registered.
    pub fn scan_all_files(&mut self) -> Result<usize> {
        let files: Vec<SmolStr> = self.all_files().iter().cloned().collect();
        let mut failures = Vec::new();
        let mut scanned = 0usize;
        for file in &files {
            match self.add_module(file, None, false) {
                Ok(_) => scanned += 1,
                Err(error) => failures.push(format!("{file}: {error}")),
            }
        }
        if failures.is_empty() {
            Ok(scanned)
        } else {
            Err(SourceError::configuration(format!(
                "scan finished with {} failure(s): {}",
                failures.len(),
                failures.join("; ")
            )))
        }
    }

    /// Remove a module and delete its backing file.
    pub fn remove_file(&mut self, file_name: &str) -> Result<()> {
        let key = SmolStr::new(self.normalize_file_name(file_name));
        match self.modules.shift_remove(&key) {
            Some(mut wrapper) => wrapper.remove(&mut self.ctx)?,
            None => {
                tracing::warn!(file = %key, "removing a file that was never registered");
                let url = self.ctx.resolve(&key);
                self.ctx.accessor.delete(&url)?;
            }
        }
        if let Some(files) = &mut self.all_files {
            files.shift_remove(&key);
        }
        Ok(())
    }

    /// Point the database at a different code base and relist it eagerly,
    /// so a broken base surfaces immediately instead of on first use.
    pub fn switch_code_base(&mut self, code_base: &str) {
        self.ctx.code_base = code_base.trim_end_matches('/').to_string();
        match self.ctx.accessor.list(&self.ctx.code_base) {
            Ok(listing) => {
                self.all_files = Some(
                    listing
                        .into_iter()
                        .filter(|name| Dialect::from_file_name(name).is_some())
                        .filter(|name| !REJECTED_FILE_NAMES.contains(&name.as_str()))
                        .map(SmolStr::new)
                        .collect(),
                );
            }
            Err(error) => {
                self.ctx
                    .prompt
                    .alert(&format!("Cannot switch to {code_base} because of {error}"));
                self.all_files = Some(IndexSet::new());
            }
        }
    }
}

impl std::fmt::Debug for SourceDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceDatabase")
            .field("id", &self.id)
            .field("code_base", &self.ctx.code_base)
            .field("modules", &self.modules.len())
            .field("browsers", &self.registered_browsers.len())
            .finish()
    }
}
