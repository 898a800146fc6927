//! ABI bindings for the Harvest contract and the token standards it buys.

use alloy_primitives::U256;
use alloy_sol_types::sol;

/// What the Harvest contract pays out per sale: 1 gwei.
pub const SALE_PRICE_WEI: U256 = U256::from_limbs([1_000_000_000, 0, 0, 0]);

sol! {
    #[sol(rpc)]
    interface IERC20 {
        function name() external view returns (string);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
        function balanceOf(address owner) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }

    #[sol(rpc)]
    interface IERC721 {
        function getApproved(uint256 tokenId) external view returns (address);
        function isApprovedForAll(address owner, address operator) external view returns (bool);
        function approve(address to, uint256 tokenId) external;
        function setApprovalForAll(address operator, bool approved) external;
    }

    #[sol(rpc)]
    interface IERC1155 {
        function balanceOf(address account, uint256 id) external view returns (uint256);
        function isApprovedForAll(address account, address operator) external view returns (bool);
        function setApprovalForAll(address operator, bool approved) external;
    }

    #[sol(rpc)]
    interface IHarvest {
        function sellErc20(address token, uint256 amount) external;
        function sellErc721(address token, uint256 tokenId) external;
        function sellErc1155(address token, uint256 tokenId, uint256 amount) external;
    }
}
