//! Closed enumerations of logical partitions, with wire strings preserved
//! bit-exactly for interop with peer clients.

use strum::{EnumCount, EnumIter, IntoEnumIterator};

/// A closed, compile-time enumeration usable as the index type of a column
/// group. Implementors are dense: `ordinal()` ranges over `0..VARIANTS.len()`
/// with no gaps, matching declaration order.
pub trait ColumnEnum: Copy + Eq + std::fmt::Debug + 'static {
    /// All variants, in declaration (and ordinal) order.
    const VARIANTS: &'static [Self];

    /// Dense index of this variant, used to index column-group arrays.
    fn ordinal(self) -> usize;

    /// Canonical wire string, stable across client versions.
    fn wire_name(self) -> &'static str;
}

/// The fifteen logical partitions of the execution-client database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumCount, EnumIter)]
pub enum ColumnName {
    State,
    Storage,
    Code,
    Blocks,
    Headers,
    BlockNumbers,
    Receipts,
    BlockInfos,
    BadBlocks,
    Bloom,
    Metadata,
    BlobTransactions,
    DiscoveryV4Nodes,
    DiscoveryV5Nodes,
    Peers,
}

impl ColumnName {
    /// Compile-time-constant list of variants, in declaration order.
    pub const VARIANTS: [ColumnName; 15] = [
        ColumnName::State,
        ColumnName::Storage,
        ColumnName::Code,
        ColumnName::Blocks,
        ColumnName::Headers,
        ColumnName::BlockNumbers,
        ColumnName::Receipts,
        ColumnName::BlockInfos,
        ColumnName::BadBlocks,
        ColumnName::Bloom,
        ColumnName::Metadata,
        ColumnName::BlobTransactions,
        ColumnName::DiscoveryV4Nodes,
        ColumnName::DiscoveryV5Nodes,
        ColumnName::Peers,
    ];

    pub fn iter() -> impl Iterator<Item = ColumnName> {
        <ColumnName as IntoEnumIterator>::iter()
    }

    pub fn from_wire_name(name: &str) -> Option<ColumnName> {
        ColumnName::VARIANTS
            .iter()
            .copied()
            .find(|c| c.wire_name() == name)
    }
}

impl ColumnEnum for ColumnName {
    const VARIANTS: &'static [ColumnName] = &ColumnName::VARIANTS;

    fn ordinal(self) -> usize {
        self as usize
    }

    fn wire_name(self) -> &'static str {
        match self {
            ColumnName::State => "state",
            ColumnName::Storage => "storage",
            ColumnName::Code => "code",
            ColumnName::Blocks => "blocks",
            ColumnName::Headers => "headers",
            ColumnName::BlockNumbers => "blockNumbers",
            ColumnName::Receipts => "receipts",
            ColumnName::BlockInfos => "blockInfos",
            ColumnName::BadBlocks => "badBlocks",
            ColumnName::Bloom => "bloom",
            ColumnName::Metadata => "metadata",
            ColumnName::BlobTransactions => "blobTransactions",
            ColumnName::DiscoveryV4Nodes => "discoveryNodes",
            ColumnName::DiscoveryV5Nodes => "discoveryV5Nodes",
            ColumnName::Peers => "peers",
        }
    }
}

/// Column families of the receipts partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumCount, EnumIter)]
pub enum ReceiptsColumn {
    Default,
    Transactions,
    Blocks,
}

impl ReceiptsColumn {
    pub const VARIANTS: [ReceiptsColumn; 3] = [
        ReceiptsColumn::Default,
        ReceiptsColumn::Transactions,
        ReceiptsColumn::Blocks,
    ];
}

impl ColumnEnum for ReceiptsColumn {
    const VARIANTS: &'static [ReceiptsColumn] = &ReceiptsColumn::VARIANTS;

    fn ordinal(self) -> usize {
        self as usize
    }

    fn wire_name(self) -> &'static str {
        match self {
            ReceiptsColumn::Default => "Default",
            ReceiptsColumn::Transactions => "Transactions",
            ReceiptsColumn::Blocks => "Blocks",
        }
    }
}

/// Column families of the blob-transaction partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumCount, EnumIter)]
pub enum BlobTxColumn {
    FullBlobTxs,
    LightBlobTxs,
    ProcessedTxs,
}

impl BlobTxColumn {
    pub const VARIANTS: [BlobTxColumn; 3] = [
        BlobTxColumn::FullBlobTxs,
        BlobTxColumn::LightBlobTxs,
        BlobTxColumn::ProcessedTxs,
    ];
}

impl ColumnEnum for BlobTxColumn {
    const VARIANTS: &'static [BlobTxColumn] = &BlobTxColumn::VARIANTS;

    fn ordinal(self) -> usize {
        self as usize
    }

    fn wire_name(self) -> &'static str {
        match self {
            BlobTxColumn::FullBlobTxs => "FullBlobTxs",
            BlobTxColumn::LightBlobTxs => "LightBlobTxs",
            BlobTxColumn::ProcessedTxs => "ProcessedTxs",
        }
    }
}
