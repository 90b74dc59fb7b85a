/*!

This is the long-form manual for `social_choice` and `scrank`.

## Input formats

The command line program reads pairwise votes from CSV files without a header:
* `pairwise` each line is `a,b,outcome`
* `pairwise_voters` each line is `a,b,outcome,voter`

The outcome is the result of `a` against `b`: `win`, `loss` or `tie`.

With `pairwise`, each vote is treated as coming from its own anonymous voter, so
vote induction turns every comparison into an ordering.
With `pairwise_voters`, the votes are grouped by voter before vote induction.

## Ranking methods

All the methods return the candidates best first. The candidates with equal scores
keep the order of the candidates. Pass `RankOptions` to get the scores, or to
group the candidates with equal scores.

### `ranked_pairs`

The victories are sorted by decreasing margin. Each victory is locked in turn, unless
it would contradict the victories locked before it (create a cycle). The ranking is
the topological order of the locked graph. The score of a candidate is the number of
candidates below it in the locked graph.

### `copeland`

Number of victories minus number of defeats, in the victory graph.

### `minimax`

The largest margin by which a candidate was beaten. Smaller is better, and the
candidates that were never beaten score 0.

### `win_ratio`, `win_tie_ratio`

`wins / (wins + losses)` and `(wins + ties) / (wins + ties + losses)`, summed over all
the opponents. A candidate without any decisive comparison scores 0.

### `borda`

For every ordering, each candidate gets one point per candidate ranked strictly
below it. This method needs complete orderings: it works directly with ranked
ballots, and with pairwise votes once `Election::enable_ordering_based_methods` was
called.

## Vote induction

Vote induction turns the pairwise votes of one voter into an ordering.

Intransitivity strategies (`--intransitivity`):
* `break_random_link` removes a random edge of each cycle
* `break_weakest_link` removes the edge of each cycle with the lowest population margin
* `add_edges_in_order` adds the votes by decreasing population margin and skips the
  ones that close a cycle

Incompleteness strategies (`--incompleteness`):
* `place_randomly` inserts each missing candidate at a random position
* `add_all_at_beginning`, `add_all_at_end` add the missing candidates as a tied group
* `add_random_edges` connects the remaining pairs in a random order
* `add_edges_by_win_ratio` connects the remaining pairs by decreasing population margin

Upsampling (`--upsampling`):
* `none` one ordering per voter
* `by_vote` the ordering of a voter is counted once per vote they cast
* `by_voter` the votes of each voter are resampled with replacement so that every
  voter casts one vote per pair of candidates

The random strategies are reproducible: pass `--seed` (or `randomSeed` in the rules).
The seed of a run is always reported in the summary.

## Configuration file

```json
{
  "outputSettings": { "contestName": "Dogs" },
  "voteSources": [
    { "provider": "pairwise_voters", "filePath": "votes.csv" }
  ],
  "candidates": [ { "name": "Rex" }, { "name": "Fido" } ],
  "rules": {
    "methods": ["ranked_pairs", "win_ratio"],
    "intransitivity": "break_weakest_link",
    "incompleteness": "add_edges_by_win_ratio",
    "upsampling": "by_vote",
    "randomSeed": "42"
  }
}
```

The candidates are optional: they are inferred from the votes when missing.

*/
