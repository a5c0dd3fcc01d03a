//! The fields of a transaction, as read by `txn`, `gtxn`, `gtxns`, `itxn` and
//! their array-accessing variants.

field_enum! {
    /// A field of a transaction in the current group.
    pub enum TransactionField in Transaction {
        Sender = "Sender", 1;
        Fee = "Fee", 1;
        FirstValid = "FirstValid", 1;
        FirstValidTime = "FirstValidTime", 7;
        LastValid = "LastValid", 1;
        Note = "Note", 1;
        Lease = "Lease", 1;
        Receiver = "Receiver", 1;
        Amount = "Amount", 1;
        CloseRemainderTo = "CloseRemainderTo", 1;
        VotePK = "VotePK", 1;
        SelectionPK = "SelectionPK", 1;
        VoteFirst = "VoteFirst", 1;
        VoteLast = "VoteLast", 1;
        VoteKeyDilution = "VoteKeyDilution", 1;
        Type = "Type", 1;
        TypeEnum = "TypeEnum", 1;
        XferAsset = "XferAsset", 1;
        AssetAmount = "AssetAmount", 1;
        AssetSender = "AssetSender", 1;
        AssetReceiver = "AssetReceiver", 1;
        AssetCloseTo = "AssetCloseTo", 1;
        GroupIndex = "GroupIndex", 1;
        TxID = "TxID", 1;
        ApplicationID = "ApplicationID", 2;
        OnCompletion = "OnCompletion", 2;
        ApplicationArgs = "ApplicationArgs", 2;
        NumAppArgs = "NumAppArgs", 2;
        Accounts = "Accounts", 2;
        NumAccounts = "NumAccounts", 2;
        ApprovalProgram = "ApprovalProgram", 2;
        ClearStateProgram = "ClearStateProgram", 2;
        RekeyTo = "RekeyTo", 2;
        ConfigAsset = "ConfigAsset", 2;
        ConfigAssetTotal = "ConfigAssetTotal", 2;
        ConfigAssetDecimals = "ConfigAssetDecimals", 2;
        ConfigAssetDefaultFrozen = "ConfigAssetDefaultFrozen", 2;
        ConfigAssetUnitName = "ConfigAssetUnitName", 2;
        ConfigAssetName = "ConfigAssetName", 2;
        ConfigAssetURL = "ConfigAssetURL", 2;
        ConfigAssetMetadataHash = "ConfigAssetMetadataHash", 2;
        ConfigAssetManager = "ConfigAssetManager", 2;
        ConfigAssetReserve = "ConfigAssetReserve", 2;
        ConfigAssetFreeze = "ConfigAssetFreeze", 2;
        ConfigAssetClawback = "ConfigAssetClawback", 2;
        FreezeAsset = "FreezeAsset", 2;
        FreezeAssetAccount = "FreezeAssetAccount", 2;
        FreezeAssetFrozen = "FreezeAssetFrozen", 2;
        Assets = "Assets", 3;
        NumAssets = "NumAssets", 3;
        Applications = "Applications", 3;
        NumApplications = "NumApplications", 3;
        GlobalNumUint = "GlobalNumUint", 3;
        GlobalNumByteSlice = "GlobalNumByteSlice", 3;
        LocalNumUint = "LocalNumUint", 3;
        LocalNumByteSlice = "LocalNumByteSlice", 3;
        ExtraProgramPages = "ExtraProgramPages", 4;
        Nonparticipation = "Nonparticipation", 5;
        Logs = "Logs", 5;
        NumLogs = "NumLogs", 5;
        CreatedAssetID = "CreatedAssetID", 5;
        CreatedApplicationID = "CreatedApplicationID", 5;
        LastLog = "LastLog", 6;
        StateProofPK = "StateProofPK", 6;
        ApprovalProgramPages = "ApprovalProgramPages", 7;
        NumApprovalProgramPages = "NumApprovalProgramPages", 7;
        ClearStateProgramPages = "ClearStateProgramPages", 7;
        NumClearStateProgramPages = "NumClearStateProgramPages", 7;
    }
}

impl TransactionField {
    /// Checks whether the field is an array that must be accessed with an
    /// index.
    #[must_use]
    pub fn is_array(self) -> bool {
        matches!(
            self,
            Self::ApplicationArgs
                | Self::Accounts
                | Self::Assets
                | Self::Applications
                | Self::Logs
                | Self::ApprovalProgramPages
                | Self::ClearStateProgramPages
        )
    }
}
