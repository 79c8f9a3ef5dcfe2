//! Definitions of Solidity functions called during deployment

use alloy::sol;

sol! {
    #[sol(rpc)]
    interface IResolver {
        function get(string calldata name) external view returns (address);
    }

    #[sol(rpc)]
    interface ISuperfluid {
        function getAgreementClass(bytes32 agreementType) external view returns (address agreementClass);
        function getERC20Wrapper(address underlyingToken, string calldata symbol) external view returns (address wrapperAddress, bool created);
    }

    #[sol(rpc)]
    interface ITestToken {
        function symbol() external view returns (string memory);
        function mint(address account, uint256 amount) external returns (bool);
        function approve(address spender, uint256 amount) external returns (bool);
        function transfer(address recipient, uint256 amount) external returns (bool);
    }

    #[sol(rpc)]
    interface ISuperToken {
        function upgrade(uint256 amount) external;
        function transfer(address recipient, uint256 amount) external returns (bool);
    }
}
