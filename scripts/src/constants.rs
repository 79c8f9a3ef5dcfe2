//! Constants used in the deploy scripts

use alloy_primitives::{address, Address};

/// The framework version tag the scripts target by default
pub const DEFAULT_SDK_VERSION: &str = "preview-20200928";

/// The default owner of the deployed application contracts
pub const DEFAULT_OWNER: Address = address!("9D3a930E48740501c94978Df634cbB40a1874D26");

/// The default name of the `TradeableCashflow` NFT
pub const DEFAULT_CASHFLOW_NAME: &str = "StreamableCashflow";

/// The default symbol of the `TradeableCashflow` NFT
pub const DEFAULT_CASHFLOW_SYMBOL: &str = "SCF";

/// The default symbol of the base token streamed by the application contracts
pub const DEFAULT_BASE_TOKEN_SYMBOL: &str = "fDAI";

/// The default amount of base token minted to the sender during setup, in whole tokens
pub const DEFAULT_MINT_AMOUNT: &str = "100";

/// The default amount of base token upgraded and transferred during setup, in whole tokens
pub const DEFAULT_WRAP_AMOUNT: &str = "70";

/// The number of decimals of the test tokens
pub const TOKEN_DECIMALS: u8 = 18;

/// The resolver address of the Superfluid framework on Goerli
pub const GOERLI_RESOLVER_ADDRESS: Address = address!("3710AB3fDE2B61736B8BB0CE845D6c61F667a78E");

/// The registry key prefix under which the framework host is registered
pub const HOST_REGISTRY_PREFIX: &str = "Superfluid.";

/// The registry key prefix under which test tokens are registered
pub const TOKEN_REGISTRY_PREFIX: &str = "tokens.";

/// The agreement type identifier preimage of the constant flow agreement
pub const CFA_AGREEMENT_TYPE: &str = "org.superfluid-finance.agreements.ConstantFlowAgreement.v1";

/// The suffix appended to a base token symbol to form its wrapper symbol
pub const WRAPPER_SYMBOL_SUFFIX: &str = "x";

/// The logical name of the framework host in the address book
pub const HOST_KEY: &str = "host";

/// The logical name of the constant flow agreement in the address book
pub const CFA_KEY: &str = "cfa";

/// The name of the `TradeableCashflow` contract artifact
pub const TRADEABLE_CASHFLOW_CONTRACT: &str = "TradeableCashflow";

/// The name of the `RedirectAll` contract artifact
pub const REDIRECT_ALL_CONTRACT: &str = "RedirectAll";

/// The default directory holding compiled contract artifacts
pub const DEFAULT_ARTIFACTS_DIR: &str = "build/contracts";

/// The extension of a compiled contract artifact
pub const ARTIFACT_EXTENSION: &str = "json";

/// The bytecode key in a compiled contract artifact
pub const ARTIFACT_BYTECODE_KEY: &str = "bytecode";

/// The deployments key in the `deployments.json` file
pub const DEPLOYMENTS_KEY: &str = "deployments";

/// The default delay between attempts of a retried call, in milliseconds
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 1000;
