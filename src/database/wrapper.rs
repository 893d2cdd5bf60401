//! Module wrappers: one named, typed source unit each.
//!
//! A wrapper owns the cached text, the parsed fragment tree, and the
//! revision token observed at load time. All writes run through an explicit
//! state machine; at most one write is in flight per wrapper, and further
//! writes queue in submission order.

use std::collections::VecDeque;
use std::sync::Arc;

use text_size::{TextRange, TextSize};

use crate::base::{DatabaseId, Dialect, ModuleName, RevisionToken};
use crate::fragment::{FileFragment, FragmentKind};
use crate::parser::{DialectParser, ParseContext, ParserSet};
use crate::resource::{PutResponse, WriteMode, WriteStatus};

use super::context::SourceContext;
use super::error::{Result, SourceError};

/// Where a wrapper stands in its write protocol.
///
/// `Idle → InFlight → {Idle | InFlight (drain one queued) | AwaitingDecision}`;
/// `AwaitingDecision → {Idle (declined) | InFlight (overwrite resubmitted)}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteState {
    Idle,
    InFlight,
    AwaitingDecision,
}

#[derive(Debug)]
struct QueuedWrite {
    source: String,
    mode: WriteMode,
    check_overwrites: bool,
}

/// A named, typed source unit backed by a file (or purely in-memory when
/// virtual).
pub struct ModuleWrapper {
    module_name: ModuleName,
    dialect: Dialect,
    parser: Option<Arc<dyn DialectParser>>,
    cached_source: Option<String>,
    ast: Option<FileFragment>,
    revision_on_load: Option<RevisionToken>,
    is_virtual: bool,
    write_state: WriteState,
    queued_writes: VecDeque<QueuedWrite>,
}

impl ModuleWrapper {
    /// Create a wrapper. The parser for the dialect is resolved once, here;
    /// a missing parser only surfaces when a parse is attempted.
    pub fn new(
        module_name: ModuleName,
        dialect: Dialect,
        source: Option<String>,
        is_virtual: bool,
        parsers: &ParserSet,
    ) -> Result<Self> {
        if module_name.is_empty() {
            return Err(SourceError::configuration(
                "cannot create a module wrapper without a module name",
            ));
        }
        Ok(Self {
            parser: parsers.get(dialect),
            module_name,
            dialect,
            cached_source: source,
            ast: None,
            revision_on_load: None,
            is_virtual,
            write_state: WriteState::Idle,
            queued_writes: VecDeque::new(),
        })
    }

    /// Create a wrapper from a relative file name, inferring module name
    /// and dialect.
    pub fn for_file(file_name: &str, is_virtual: bool, parsers: &ParserSet) -> Result<Self> {
        let (module_name, dialect) = ModuleName::from_file_name(file_name).ok_or_else(|| {
            SourceError::configuration(format!("unknown dialect for file {file_name}"))
        })?;
        Self::new(module_name, dialect, None, is_virtual, parsers)
    }

    #[inline]
    pub fn module_name(&self) -> &ModuleName {
        &self.module_name
    }

    #[inline]
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    #[inline]
    pub fn is_virtual(&self) -> bool {
        self.is_virtual
    }

    #[inline]
    pub fn ast(&self) -> Option<&FileFragment> {
        self.ast.as_ref()
    }

    #[inline]
    pub fn cached_source(&self) -> Option<&str> {
        self.cached_source.as_deref()
    }

    #[inline]
    pub fn revision_on_load(&self) -> Option<&RevisionToken> {
        self.revision_on_load.as_ref()
    }

    pub fn has_write_in_flight(&self) -> bool {
        self.write_state == WriteState::InFlight
    }

    pub fn is_awaiting_overwrite_decision(&self) -> bool {
        self.write_state == WriteState::AwaitingDecision
    }

    pub fn queued_write_count(&self) -> usize {
        self.queued_writes.len()
    }

    /// The backing file name: dotted module name with separators, plus the
    /// dialect extension.
    pub fn file_name(&self) -> String {
        self.module_name.file_name(self.dialect)
    }

    /// The file name resolved against a code base.
    pub fn file_url(&self, code_base: &str) -> String {
        let file_name = self.file_name();
        if code_base.is_empty() {
            file_name
        } else {
            format!("{}/{}", code_base.trim_end_matches('/'), file_name)
        }
    }

    pub fn set_cached_source(&mut self, source: String) {
        self.cached_source = Some(source);
    }

    /// Cached text if present, a fresh fetch otherwise.
    pub fn source(&mut self, ctx: &mut SourceContext) -> Result<String> {
        match &self.cached_source {
            Some(source) => Ok(source.clone()),
            None => self.source_uncached(ctx),
        }
    }

    /// Fetch text bypassing the cache.
    ///
    /// Virtual wrappers never touch the transport: their cache is the
    /// source of truth, and an empty cache stays empty rather than being
    /// coerced. Backed wrappers coerce an absent resource to empty text and
    /// refresh the stored revision token.
    pub fn source_uncached(&mut self, ctx: &mut SourceContext) -> Result<String> {
        if self.is_virtual {
            return self.cached_source.clone().ok_or_else(|| {
                SourceError::configuration(format!(
                    "virtual module {} has no cached source",
                    self.module_name
                ))
            });
        }
        let url = self.file_url(&ctx.code_base);
        let content = ctx.accessor.get(&url, true)?.unwrap_or_default();
        self.cached_source = Some(content.clone());
        self.refresh_revision(ctx)?;
        Ok(content)
    }

    fn refresh_revision(&mut self, ctx: &mut SourceContext) -> Result<()> {
        if self.is_virtual {
            return Ok(());
        }
        let url = self.file_url(&ctx.code_base);
        self.revision_on_load = Some(ctx.accessor.head_revision(&url)?);
        Ok(())
    }

    /// Parse `source` into a fragment tree rooted for this dialect.
    ///
    /// Script sources promote a leading module definition to the root; in
    /// every other case a synthetic whole-file fragment wraps the top-level
    /// fragments.
    pub fn parse(&self, source: &str, database: DatabaseId) -> Result<FileFragment> {
        let Some(parser) = &self.parser else {
            return Err(SourceError::configuration(format!(
                "don't know how to parse {} of {}",
                self.dialect, self.module_name
            )));
        };
        let file_name = self.file_name();
        let ctx = ParseContext {
            file_name: &file_name,
            database,
        };
        let top_level = parser.parse_source(source, &ctx);

        if self.dialect == Dialect::Script {
            let first_real = top_level
                .iter()
                .position(|f| f.kind() != FragmentKind::Comment);
            if let Some(idx) = first_real {
                if top_level[idx].kind() == FragmentKind::ModuleDef {
                    let mut top_level = top_level;
                    return Ok(top_level.swap_remove(idx));
                }
            }
        }

        Ok(FileFragment::new(
            FragmentKind::CompleteFile,
            None,
            TextRange::new(TextSize::new(0), TextSize::of(source)),
            file_name.as_str(),
            top_level,
            database,
        ))
    }

    /// Parse the current source and cache the result as this wrapper's ast.
    pub fn retrieve_source_and_parse(
        &mut self,
        ctx: &mut SourceContext,
        database: DatabaseId,
    ) -> Result<&FileFragment> {
        let source = self.source(ctx)?;
        let root = self.parse(&source, database)?;
        Ok(self.ast.insert(root))
    }

    /// Update the cached text and persist it.
    ///
    /// The cache updates immediately, so local readers see the new text
    /// regardless of how the network write resolves. Virtual wrappers stop
    /// there. If a write is already in flight (or a conflict decision is
    /// pending) the new write queues in submission order instead of racing.
    pub fn set_source(
        &mut self,
        source: String,
        mode: WriteMode,
        check_overwrites: bool,
        ctx: &mut SourceContext,
    ) -> Result<()> {
        self.cached_source = Some(source.clone());
        if self.is_virtual {
            return Ok(());
        }
        if self.write_state != WriteState::Idle {
            self.queued_writes.push_back(QueuedWrite {
                source,
                mode,
                check_overwrites,
            });
            return Ok(());
        }
        self.submit_write(source, mode, check_overwrites, ctx)
    }

    fn submit_write(
        &mut self,
        source: String,
        mode: WriteMode,
        check_overwrites: bool,
        ctx: &mut SourceContext,
    ) -> Result<()> {
        let url = self.file_url(&ctx.code_base);
        let precondition = if check_overwrites {
            self.revision_on_load.clone()
        } else {
            None
        };
        match ctx
            .accessor
            .put(&url, &source, None, precondition.as_ref(), mode)?
        {
            PutResponse::Pending(_) => {
                self.write_state = WriteState::InFlight;
                Ok(())
            }
            PutResponse::Done(status) => {
                self.write_state = WriteState::InFlight;
                self.complete_write(status, ctx)
            }
        }
    }

    /// Apply a write completion delivered by the transport.
    pub fn complete_write(&mut self, status: WriteStatus, ctx: &mut SourceContext) -> Result<()> {
        match status {
            WriteStatus::Saved => {
                self.write_state = WriteState::Idle;
                self.refresh_revision(ctx)?;
                // Exactly one queued write per completion.
                self.drain_one_queued(ctx)
            }
            WriteStatus::Conflict => {
                self.write_state = WriteState::AwaitingDecision;
                let url = self.file_url(&ctx.code_base);
                ctx.prompt
                    .confirm(&format!("{url} was changed since loading it. Overwrite?"));
                Ok(())
            }
            WriteStatus::Failed(code) => {
                tracing::warn!(module = %self.module_name, code, "write failed");
                self.write_state = WriteState::Idle;
                Ok(())
            }
        }
    }

    fn drain_one_queued(&mut self, ctx: &mut SourceContext) -> Result<()> {
        let Some(queued) = self.queued_writes.pop_front() else {
            return Ok(());
        };
        self.set_source(queued.source, queued.mode, queued.check_overwrites, ctx)
    }

    /// Apply the user's answer to an overwrite prompt.
    ///
    /// Declining abandons the write and everything queued behind it.
    /// Accepting refreshes the revision token and resubmits the cached
    /// text against it.
    pub fn resolve_overwrite(&mut self, overwrite: bool, ctx: &mut SourceContext) -> Result<()> {
        self.queued_writes.clear();
        if self.write_state != WriteState::AwaitingDecision {
            return Ok(());
        }
        self.write_state = WriteState::Idle;
        if !overwrite {
            return Ok(());
        }
        self.refresh_revision(ctx)?;
        let source = self.source(ctx)?;
        self.set_source(source, WriteMode::Async, true, ctx)
    }

    /// Delete the backing file. No-op for virtual wrappers.
    pub fn remove(&mut self, ctx: &mut SourceContext) -> Result<()> {
        if self.is_virtual {
            return Ok(());
        }
        let url = self.file_url(&ctx.code_base);
        ctx.accessor.delete(&url)?;
        Ok(())
    }
}

impl std::fmt::Debug for ModuleWrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleWrapper")
            .field("module_name", &self.module_name)
            .field("dialect", &self.dialect)
            .field("is_virtual", &self.is_virtual)
            .field("cached", &self.cached_source.is_some())
            .field("write_state", &self.write_state)
            .field("queued", &self.queued_writes.len())
            .finish()
    }
}

/// Generate a unique id for a virtual (file-less) module.
pub fn new_virtual_module_id() -> String {
    format!("virtual-module.x{}", uuid::Uuid::new_v4().simple())
}
