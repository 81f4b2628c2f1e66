//! Solidity type and function signatures for the contracts this crate
//! builds calldata for (`spec` §6, "Contract ABIs consumed"). Generated with
//! [`alloy_sol_types::sol!`], the same macro the teacher's `contracts` crate
//! uses for its bindings.

use alloy_sol_types::sol;

sol! {
    /// One input or output vault slot of an order.
    #[derive(Debug, Clone)]
    struct IoV3 {
        address token;
        uint8 decimals;
        uint256 vaultId;
    }

    /// The on-chain executable payload attached to an order or a withdraw
    /// task.
    #[derive(Debug, Clone)]
    struct EvaluableV3 {
        address interpreter;
        address store;
        bytes bytecode;
    }

    /// An order as consumed by the orderbook contract.
    #[derive(Debug, Clone)]
    struct OrderV3 {
        address owner;
        EvaluableV3 evaluable;
        IoV3[] validInputs;
        IoV3[] validOutputs;
        bytes32 nonce;
    }

    #[derive(Debug, Clone)]
    struct TakeOrderConfigV3 {
        OrderV3 order;
        uint256 inputIOIndex;
        uint256 outputIOIndex;
        bytes[] signedContext;
    }

    #[derive(Debug, Clone)]
    struct TakeOrdersConfigV3 {
        uint256 minimumInput;
        uint256 maximumInput;
        uint256 maximumIORatio;
        TakeOrderConfigV3[] orders;
        bytes data;
    }

    #[derive(Debug, Clone)]
    struct ClearConfig {
        uint256 aliceInputIOIndex;
        uint256 aliceOutputIOIndex;
        uint256 bobInputIOIndex;
        uint256 bobOutputIOIndex;
        uint256 aliceBountyVaultId;
        uint256 bobBountyVaultId;
    }

    function arb3(address orderbook, TakeOrdersConfigV3 takeOrdersConfig, EvaluableV3 task) external;

    function multicall(bytes[] data) external payable;

    function clear2(
        OrderV3 aliceOrder,
        OrderV3 bobOrder,
        ClearConfig clearConfig,
        bytes[] aliceSignedContext,
        bytes[] bobSignedContext
    ) external;

    function withdraw2(address token, uint256 vaultId, uint256 amount, EvaluableV3[] tasks) external;

    function balanceOf(address account) external view returns (uint256);
}
